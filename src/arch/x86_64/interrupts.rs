/*
 * PIC and Tick Source Setup
 *
 * The 8259 PIC is remapped so hardware IRQs don't collide with CPU
 * exception vectors, then every line except IRQ0 (the PIT) is masked off.
 * This kernel has exactly one interrupt source: the periodic tick. Remapping
 * happens at boot (`init`, called from `kstart`); the PIT itself is not
 * armed until `kernel::boot::start` calls `arm_tick`, matching spec §4.7
 * ("arm the periodic tick" is part of `start`, not of early boot).
 */

use pic8259::ChainedPics;
use spin::Mutex;

const PIC_1_OFFSET: u8 = 32;
const PIC_2_OFFSET: u8 = PIC_1_OFFSET + 8;

/// IRQ0 (the PIT) lands at this vector after remapping.
pub const TICK_VECTOR: u8 = PIC_1_OFFSET;

/// The PIT's fixed input clock.
const PIT_INPUT_HZ: u64 = 1_193_182;

/// PIT reload value derived from `config::TICK_PERIOD_MS`, rounded to the
/// nearest count rather than truncated - this is the single place the
/// config constant actually drives hardware state.
const PIT_RELOAD: u16 =
    ((PIT_INPUT_HZ * crate::config::TICK_PERIOD_MS as u64 + 500) / 1000) as u16;

static PICS: Mutex<ChainedPics> =
    unsafe { Mutex::new(ChainedPics::new(PIC_1_OFFSET, PIC_2_OFFSET)) };

/// Remap the PICs and mask every line but the timer. Interrupts are left
/// disabled; the caller enables them once the kernel is ready to run its
/// first task. Does not arm the PIT itself - see `arm_tick`.
pub fn init() {
    unsafe {
        PICS.lock().initialize();
        // Mask everything, then unmask only IRQ0 (timer) on the master.
        PICS.lock().write_masks(0b1111_1110, 0b1111_1111);
    }
    log::info!("PIC remapped, tick vector {}", TICK_VECTOR);
}

/// Program the PIT for the kernel's tick period. Called once, from
/// `kernel::boot::start`, with interrupts already disabled; the tick fires
/// for the first time only once `start` has re-enabled interrupts by
/// dispatching into the first task.
pub fn arm_tick() {
    use x86_64::instructions::port::Port;

    const PIT_CHANNEL_0: u16 = 0x40;
    const PIT_COMMAND: u16 = 0x43;
    const MODE_2_RATE_GENERATOR: u8 = 0x34;

    let mut command: Port<u8> = Port::new(PIT_COMMAND);
    let mut channel0: Port<u8> = Port::new(PIT_CHANNEL_0);

    unsafe {
        command.write(MODE_2_RATE_GENERATOR);
        channel0.write((PIT_RELOAD & 0xFF) as u8);
        channel0.write((PIT_RELOAD >> 8) as u8);
    }
    log::info!("PIT armed, {} ms tick period", crate::config::TICK_PERIOD_MS);
}

/// Called from the tick ISR after `kernel::tick::on_tick` has run.
///
/// # Safety
///
/// Must only be called from the tick interrupt handler itself.
pub unsafe fn notify_end_of_tick() {
    unsafe {
        PICS.lock().notify_end_of_interrupt(TICK_VECTOR);
    }
}
