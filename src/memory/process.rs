// Sat Oct 17 2026 - Alex

use crate::memory::{Address, MemoryRegion, PageProtection};

pub use platform::ProcessMemory;

/// Every mapping listed in a maps file is backed, so all regions come back committed.
pub fn parse_maps(content: &str) -> Vec<MemoryRegion> {
    content.lines().filter_map(parse_map_line).collect()
}

fn parse_map_line(line: &str) -> Option<MemoryRegion> {
    // 7f8a1000-7f8a2000 r-xp 00000000 08:01 12345  /lib/libc.so.6
    let mut parts = line.split_whitespace();
    let (start, end) = parts.next()?.split_once('-')?;
    let perms = parts.next()?.as_bytes();
    if perms.len() < 3 {
        return None;
    }

    let start = u64::from_str_radix(start, 16).ok()?;
    let end = u64::from_str_radix(end, 16).ok()?;
    if end <= start {
        return None;
    }

    let protection = PageProtection::from_rwx(perms[0] == b'r', perms[1] == b'w', perms[2] == b'x');
    Some(MemoryRegion::committed(Address::new(start), end - start, protection))
}

#[cfg(target_os = "linux")]
mod platform {
    use crate::memory::region::locate_region;
    use crate::memory::{Address, MemoryError, MemoryRegion, MemorySource, ReadError};
    use parking_lot::Mutex;
    use std::fs;
    use std::io::ErrorKind;

    /// The maps file is parsed once per enumeration pass.
    pub struct ProcessMemory {
        pid: libc::pid_t,
        layout: Mutex<Option<Vec<MemoryRegion>>>,
    }

    impl ProcessMemory {
        pub fn attach(pid: u32) -> Result<Self, MemoryError> {
            let pid = libc::pid_t::try_from(pid)
                .map_err(|_| MemoryError::ProcessNotFound(format!("Invalid pid {}", pid)))?;
            let maps = format!("/proc/{}/maps", pid);
            match fs::File::open(&maps) {
                Ok(_) => Ok(Self {
                    pid,
                    layout: Mutex::new(None),
                }),
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    Err(MemoryError::ProcessNotFound(format!("Process {} not found", pid)))
                }
                Err(e) if e.kind() == ErrorKind::PermissionDenied => Err(MemoryError::PermissionDenied(
                    format!("Cannot inspect process {}. ptrace access may be required.", pid),
                )),
                Err(e) => Err(MemoryError::Io(e)),
            }
        }

        pub fn pid(&self) -> u32 {
            self.pid as u32
        }

        pub fn regions(&self) -> Result<Vec<MemoryRegion>, MemoryError> {
            let content = fs::read_to_string(format!("/proc/{}/maps", self.pid))?;
            Ok(super::parse_maps(&content))
        }

        fn load_layout(&self) -> Option<Vec<MemoryRegion>> {
            match self.regions() {
                Ok(regions) => {
                    log::trace!("Loaded {} mappings of {}", regions.len(), self.pid);
                    Some(regions)
                }
                Err(e) => {
                    log::warn!("Failed to read memory map of {}: {}", self.pid, e);
                    None
                }
            }
        }
    }

    impl MemorySource for ProcessMemory {
        fn refresh_layout(&self) {
            *self.layout.lock() = self.load_layout();
        }

        fn query_region(&self, cursor: Address) -> Option<MemoryRegion> {
            let mut layout = self.layout.lock();
            if layout.is_none() {
                *layout = self.load_layout();
            }
            locate_region(layout.as_deref()?, cursor)
        }

        fn read(&self, address: Address, buf: &mut [u8]) -> Result<usize, ReadError> {
            if buf.is_empty() {
                return Ok(0);
            }

            let local = libc::iovec {
                iov_base: buf.as_mut_ptr() as *mut libc::c_void,
                iov_len: buf.len(),
            };
            let remote = libc::iovec {
                iov_base: address.as_u64() as usize as *mut libc::c_void,
                iov_len: buf.len(),
            };

            let read = unsafe { libc::process_vm_readv(self.pid, &local, 1, &remote, 1, 0) };
            if read < 0 {
                let err = std::io::Error::last_os_error();
                return match err.raw_os_error() {
                    Some(libc::EFAULT) | Some(libc::EIO) | Some(libc::ENOMEM) => {
                        Err(ReadError::Inaccessible(address.as_u64()))
                    }
                    _ => Err(ReadError::failed(address.as_u64(), err)),
                };
            }
            if read == 0 {
                return Err(ReadError::Inaccessible(address.as_u64()));
            }
            Ok(read as usize)
        }
    }
}

#[cfg(target_os = "macos")]
#[allow(non_camel_case_types)]
mod platform {
    use crate::memory::{Address, MemoryError, MemoryRegion, MemorySource, PageProtection, ReadError};
    use libc::{c_int, c_uint};

    type mach_port_t = c_uint;
    type kern_return_t = c_int;
    type vm_address_t = u64;
    type vm_size_t = u64;
    type vm_prot_t = c_int;
    type vm_region_flavor_t = c_int;
    type vm_region_info_t = *mut c_int;

    const KERN_SUCCESS: kern_return_t = 0;
    const KERN_INVALID_ADDRESS: kern_return_t = 1;
    const KERN_PROTECTION_FAILURE: kern_return_t = 2;
    const VM_REGION_BASIC_INFO_64: vm_region_flavor_t = 9;
    const VM_REGION_BASIC_INFO_COUNT_64: u32 = 9;
    const VM_PROT_READ: vm_prot_t = 1;
    const VM_PROT_WRITE: vm_prot_t = 2;
    const VM_PROT_EXECUTE: vm_prot_t = 4;

    #[repr(C, packed(4))]
    #[derive(Debug, Clone, Copy, Default)]
    #[allow(dead_code)]
    struct vm_region_basic_info_64 {
        protection: vm_prot_t,
        max_protection: vm_prot_t,
        inheritance: c_uint,
        shared: c_uint,
        reserved: c_uint,
        offset: u64,
        behavior: c_int,
        user_wired_count: u16,
    }

    extern "C" {
        fn mach_task_self() -> mach_port_t;
        fn task_for_pid(target_task: mach_port_t, pid: c_int, task: *mut mach_port_t) -> kern_return_t;
        fn vm_read_overwrite(
            target_task: mach_port_t,
            address: vm_address_t,
            size: vm_size_t,
            data: vm_address_t,
            out_size: *mut vm_size_t,
        ) -> kern_return_t;
        fn mach_vm_region(
            target_task: mach_port_t,
            address: *mut vm_address_t,
            size: *mut vm_size_t,
            flavor: vm_region_flavor_t,
            info: vm_region_info_t,
            info_count: *mut u32,
            object_name: *mut mach_port_t,
        ) -> kern_return_t;
    }

    pub struct ProcessMemory {
        pid: c_int,
        task: mach_port_t,
    }

    impl ProcessMemory {
        pub fn attach(pid: u32) -> Result<Self, MemoryError> {
            let pid = c_int::try_from(pid)
                .map_err(|_| MemoryError::ProcessNotFound(format!("Invalid pid {}", pid)))?;
            let mut task: mach_port_t = 0;
            let result = unsafe { task_for_pid(mach_task_self(), pid, &mut task) };
            if result != KERN_SUCCESS {
                return Err(MemoryError::PermissionDenied(format!(
                    "Failed to attach to process {} (error {}). Root privileges may be required.",
                    pid, result
                )));
            }
            Ok(Self { pid, task })
        }

        pub fn pid(&self) -> u32 {
            self.pid as u32
        }

        pub fn regions(&self) -> Result<Vec<MemoryRegion>, MemoryError> {
            let mut regions = Vec::new();
            let mut cursor = Address::zero();
            while let Some(region) = self.query_region(cursor) {
                regions.push(region);
                match region.base().checked_add(region.size()) {
                    Some(next) if next > cursor => cursor = next,
                    _ => break,
                }
            }
            Ok(regions)
        }
    }

    impl MemorySource for ProcessMemory {
        fn query_region(&self, cursor: Address) -> Option<MemoryRegion> {
            let mut address: vm_address_t = cursor.as_u64();
            let mut size: vm_size_t = 0;
            let mut info = vm_region_basic_info_64::default();
            let mut info_count = VM_REGION_BASIC_INFO_COUNT_64;
            let mut object_name: mach_port_t = 0;

            let result = unsafe {
                mach_vm_region(
                    self.task,
                    &mut address,
                    &mut size,
                    VM_REGION_BASIC_INFO_64,
                    &mut info as *mut _ as vm_region_info_t,
                    &mut info_count,
                    &mut object_name,
                )
            };
            if result != KERN_SUCCESS || size == 0 {
                return None;
            }

            let prot = info.protection;
            let protection = PageProtection::from_rwx(
                prot & VM_PROT_READ != 0,
                prot & VM_PROT_WRITE != 0,
                prot & VM_PROT_EXECUTE != 0,
            );
            Some(MemoryRegion::committed(Address::new(address), size, protection))
        }

        fn read(&self, address: Address, buf: &mut [u8]) -> Result<usize, ReadError> {
            let mut out_size: vm_size_t = 0;
            let result = unsafe {
                vm_read_overwrite(
                    self.task,
                    address.as_u64(),
                    buf.len() as vm_size_t,
                    buf.as_mut_ptr() as vm_address_t,
                    &mut out_size,
                )
            };
            match result {
                KERN_SUCCESS => Ok(out_size as usize),
                KERN_INVALID_ADDRESS | KERN_PROTECTION_FAILURE => {
                    Err(ReadError::Inaccessible(address.as_u64()))
                }
                other => Err(ReadError::failed(
                    address.as_u64(),
                    std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("vm_read_overwrite returned {}", other),
                    ),
                )),
            }
        }
    }
}

#[cfg(windows)]
mod platform {
    use crate::memory::{
        Address, CommitState, MemoryError, MemoryRegion, MemorySource, PageProtection, ReadError,
    };
    use std::ffi::c_void;
    use windows::Win32::Foundation::{CloseHandle, ERROR_NOACCESS, ERROR_PARTIAL_COPY, HANDLE};
    use windows::Win32::System::Diagnostics::Debug::ReadProcessMemory;
    use windows::Win32::System::Memory::{
        VirtualQueryEx, MEMORY_BASIC_INFORMATION, MEM_COMMIT, MEM_RESERVE,
    };
    use windows::Win32::System::Threading::{
        OpenProcess, PROCESS_QUERY_INFORMATION, PROCESS_VM_READ,
    };

    pub struct ProcessMemory {
        pid: u32,
        handle: HANDLE,
    }

    unsafe impl Send for ProcessMemory {}
    unsafe impl Sync for ProcessMemory {}

    impl ProcessMemory {
        pub fn attach(pid: u32) -> Result<Self, MemoryError> {
            let handle = unsafe { OpenProcess(PROCESS_QUERY_INFORMATION | PROCESS_VM_READ, false, pid) }
                .map_err(|e| {
                    MemoryError::PermissionDenied(format!("Failed to open process {}: {}", pid, e))
                })?;
            Ok(Self { pid, handle })
        }

        pub fn pid(&self) -> u32 {
            self.pid
        }

        pub fn regions(&self) -> Result<Vec<MemoryRegion>, MemoryError> {
            let mut regions = Vec::new();
            let mut cursor = Address::zero();
            while let Some(region) = self.query_region(cursor) {
                if region.is_committed() {
                    regions.push(region);
                }
                match region.base().checked_add(region.size()) {
                    Some(next) if next > cursor => cursor = next,
                    _ => break,
                }
            }
            Ok(regions)
        }
    }

    impl Drop for ProcessMemory {
        fn drop(&mut self) {
            let _ = unsafe { CloseHandle(self.handle) };
        }
    }

    impl MemorySource for ProcessMemory {
        fn query_region(&self, cursor: Address) -> Option<MemoryRegion> {
            let mut info = MEMORY_BASIC_INFORMATION::default();
            let written = unsafe {
                VirtualQueryEx(
                    self.handle,
                    Some(cursor.as_u64() as usize as *const c_void),
                    &mut info,
                    std::mem::size_of::<MEMORY_BASIC_INFORMATION>(),
                )
            };
            if written == 0 {
                return None;
            }

            let state = if info.State == MEM_COMMIT {
                CommitState::Committed
            } else if info.State == MEM_RESERVE {
                CommitState::Reserved
            } else {
                CommitState::Free
            };
            Some(MemoryRegion::new(
                Address::new(info.BaseAddress as usize as u64),
                info.RegionSize as u64,
                state,
                PageProtection::from_bits_truncate(info.Protect.0),
            ))
        }

        fn read(&self, address: Address, buf: &mut [u8]) -> Result<usize, ReadError> {
            let mut read = 0usize;
            let result = unsafe {
                ReadProcessMemory(
                    self.handle,
                    address.as_u64() as usize as *const c_void,
                    buf.as_mut_ptr().cast(),
                    buf.len(),
                    Some(&mut read as *mut usize),
                )
            };
            match result {
                Ok(()) => Ok(read),
                Err(e)
                    if e.code() == ERROR_PARTIAL_COPY.to_hresult()
                        || e.code() == ERROR_NOACCESS.to_hresult() =>
                {
                    if read > 0 {
                        Ok(read)
                    } else {
                        Err(ReadError::Inaccessible(address.as_u64()))
                    }
                }
                Err(e) => Err(ReadError::failed(
                    address.as_u64(),
                    std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
                )),
            }
        }
    }
}

#[cfg(not(any(target_os = "linux", target_os = "macos", windows)))]
mod platform {
    use crate::memory::{Address, MemoryError, MemoryRegion, MemorySource, ReadError};

    pub struct ProcessMemory {
        pid: u32,
    }

    impl ProcessMemory {
        pub fn attach(pid: u32) -> Result<Self, MemoryError> {
            Err(MemoryError::NotSupported(format!(
                "Process memory access is not available on this platform (pid {})",
                pid
            )))
        }

        pub fn pid(&self) -> u32 {
            self.pid
        }

        pub fn regions(&self) -> Result<Vec<MemoryRegion>, MemoryError> {
            Ok(Vec::new())
        }
    }

    impl MemorySource for ProcessMemory {
        fn query_region(&self, _cursor: Address) -> Option<MemoryRegion> {
            None
        }

        fn read(&self, address: Address, _buf: &mut [u8]) -> Result<usize, ReadError> {
            Err(ReadError::Inaccessible(address.as_u64()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAPS: &str = "\
55d0c6a00000-55d0c6a02000 r--p 00000000 08:01 1311 /usr/bin/cat
55d0c6a02000-55d0c6a07000 r-xp 00002000 08:01 1311 /usr/bin/cat
55d0c8123000-55d0c8144000 rw-p 00000000 00:00 0    [heap]
7f3b2c000000-7f3b2c001000 ---p 00000000 00:00 0
7ffd7a9e0000-7ffd7aa01000 rwxp 00000000 00:00 0    [stack]
garbage line
";

    #[test]
    fn test_parse_maps_protection_classes() {
        let regions = parse_maps(MAPS);
        assert_eq!(regions.len(), 5);
        assert_eq!(regions[0].protection(), PageProtection::READONLY);
        assert_eq!(regions[1].protection(), PageProtection::EXECUTE_READ);
        assert_eq!(regions[2].protection(), PageProtection::READWRITE);
        assert_eq!(regions[3].protection(), PageProtection::NOACCESS);
        assert_eq!(regions[4].protection(), PageProtection::EXECUTE_READWRITE);
        assert!(regions.iter().all(|r| r.is_committed()));
    }

    #[test]
    fn test_parse_maps_bounds() {
        let regions = parse_maps(MAPS);
        assert_eq!(regions[2].base(), Address::new(0x55d0c8123000));
        assert_eq!(regions[2].size(), 0x21000);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_scan_own_process() {
        use crate::memory::MemorySource;

        let marker: Vec<u8> = vec![0x5A, 0x17, 0xC3, 0x99, 0x42, 0x0F, 0xE1, 0x7B];
        let own = ProcessMemory::attach(std::process::id()).unwrap();
        let addr = Address::new(marker.as_ptr() as u64);

        let mut buf = [0u8; 8];
        assert_eq!(own.read(addr, &mut buf).unwrap(), 8);
        assert_eq!(buf.to_vec(), marker);

        let region = own.query_region(addr).unwrap();
        assert!(region.contains(addr));
        assert!(region.protection().can_write());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_each_pass_sees_new_mappings() {
        use crate::memory::{MemorySource, RegionEnumerator};

        let own = ProcessMemory::attach(std::process::id()).unwrap();
        assert!(own.query_region(Address::zero()).is_some());

        let block = vec![0x11u8; 16 << 20];
        let addr = Address::new(block.as_ptr() as u64);
        let regions: Vec<_> = RegionEnumerator::new(&own, addr, addr + 1, PageProtection::all()).collect();

        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].base(), addr);
        assert_eq!(regions[0].protection(), PageProtection::READWRITE);
    }
}
