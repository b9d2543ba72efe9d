/*
 * BOOTBOOT Loader Protocol
 *
 * The BOOTBOOT loader maps a fixed-layout info structure at a well-known
 * virtual address before jumping to `_start` on every core. This is the
 * subset of that structure `_start` and `kstart` actually read: which
 * core is the bootstrap processor (`bspid`), so APs can be parked
 * immediately instead of racing the BSP into kernel init.
 *
 * Field layout is the public BOOTBOOT protocol, not this kernel's own
 * design - see https://gitlab.com/bztsrc/bootboot for the full spec.
 */

#[repr(C)]
pub struct Bootboot {
    pub magic: [u8; 4],
    pub size: u32,
    pub protocol: u8,
    pub fb_type: u8,
    pub numcores: u16,
    pub bspid: u16,
    pub timezone: i16,
    pub datetime: [u8; 8],
    pub initrd_ptr: u64,
    pub initrd_size: u64,
    pub fb_ptr: u64,
    pub fb_size: u32,
    pub fb_width: u32,
    pub fb_height: u32,
    pub fb_scanline: u32,
    // x86_64 arch-specific tail: ACPI/SMBIOS/EFI/MP table pointers.
    pub acpi_ptr: u64,
    pub smbi_ptr: u64,
    pub efi_ptr: u64,
    pub mp_ptr: u64,
}

/// Storage for the info structure, placed at the fixed virtual address the
/// loader writes to by the kernel's linker script. `_start`'s inline asm
/// reads `bootboot.bspid` directly by symbol name before Rust code (and
/// this module's static initializer) ever runs.
#[unsafe(no_mangle)]
#[allow(non_upper_case_globals)]
pub static mut bootboot: Bootboot = Bootboot {
    magic: [0; 4],
    size: 0,
    protocol: 0,
    fb_type: 0,
    numcores: 0,
    bspid: 0,
    timezone: 0,
    datetime: [0; 8],
    initrd_ptr: 0,
    initrd_size: 0,
    fb_ptr: 0,
    fb_size: 0,
    fb_width: 0,
    fb_height: 0,
    fb_scanline: 0,
    acpi_ptr: 0,
    smbi_ptr: 0,
    efi_ptr: 0,
    mp_ptr: 0,
};
