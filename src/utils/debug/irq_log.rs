/*
 * IRQ-Safe Logging
 *
 * Minimal logging safe to call from the tick ISR and the panic handler:
 * no heap allocation, no formatting, no locks. Writes raw bytes straight
 * to the COM2 UART data register, busy-waiting on the line-status port.
 */

use x86_64::instructions::port::Port;

const COM2_DATA: u16 = 0x2F8;
const COM2_LINE_STATUS: u16 = 0x2FD;
const LINE_STATUS_OUTPUT_EMPTY: u8 = 1 << 5;

/// Write a raw string directly to the serial port without formatting or locking.
pub fn irq_log_str(msg: &str) {
    let mut data_port: Port<u8> = Port::new(COM2_DATA);
    let mut status_port: Port<u8> = Port::new(COM2_LINE_STATUS);

    for byte in msg.bytes() {
        unsafe {
            while (status_port.read() & LINE_STATUS_OUTPUT_EMPTY) == 0 {
                core::hint::spin_loop();
            }
            data_port.write(byte);
        }
    }
}

pub fn irq_log_newline() {
    irq_log_str("\r\n");
}

/// Log a single prefix line (tick expiry traces, panic banners).
pub fn irq_log_simple(prefix: &str) {
    irq_log_str("[irq] ");
    irq_log_str(prefix);
    irq_log_newline();
}
