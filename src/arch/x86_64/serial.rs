/*
 * 16550 UART Driver (COM2, Debug Console)
 *
 * COM1 is reserved for whichever console BOOTBOOT itself may be using;
 * all kernel logging goes out COM2 instead, matching the split used by the
 * IRQ-safe raw logger in `utils::debug::irq_log`.
 */

use core::fmt;

use bitflags::bitflags;
use spin::Mutex;
use x86_64::instructions::port::Port;

const COM2_BASE: u16 = 0x2F8;

bitflags! {
    /// Line Status Register bits (UART offset +5).
    struct LineStatus: u8 {
        const OUTPUT_EMPTY = 1 << 5;
    }
}

bitflags! {
    /// Interrupt Enable Register bits (UART offset +1).
    struct InterruptEnable: u8 {
        const NONE = 0;
    }
}

pub struct SerialPort {
    data: Port<u8>,
    interrupt_enable: Port<u8>,
    fifo_control: Port<u8>,
    line_control: Port<u8>,
    modem_control: Port<u8>,
    line_status: Port<u8>,
}

impl SerialPort {
    const fn new(base: u16) -> Self {
        SerialPort {
            data: Port::new(base),
            interrupt_enable: Port::new(base + 1),
            fifo_control: Port::new(base + 2),
            line_control: Port::new(base + 3),
            modem_control: Port::new(base + 4),
            line_status: Port::new(base + 5),
        }
    }

    /// Bring the UART up: 38400 baud, 8N1, FIFO enabled, IRQs off.
    fn init(&mut self) {
        unsafe {
            self.interrupt_enable.write(InterruptEnable::NONE.bits());
            self.line_control.write(0x80); // enable DLAB
            self.data.write(0x03); // divisor low byte (38400 baud)
            self.interrupt_enable.write(0x00); // divisor high byte
            self.line_control.write(0x03); // 8 bits, no parity, one stop bit
            self.fifo_control.write(0xC7); // enable FIFO, clear, 14-byte threshold
            self.modem_control.write(0x0B); // RTS/DSR set
        }
    }

    fn line_status(&mut self) -> LineStatus {
        LineStatus::from_bits_truncate(unsafe { self.line_status.read() })
    }

    fn send(&mut self, byte: u8) {
        while !self.line_status().contains(LineStatus::OUTPUT_EMPTY) {
            core::hint::spin_loop();
        }
        unsafe {
            self.data.write(byte);
        }
    }

    fn write_str(&mut self, s: &str) {
        for byte in s.bytes() {
            self.send(byte);
        }
    }
}

impl fmt::Write for SerialPort {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        SerialPort::write_str(self, s);
        Ok(())
    }
}

static SERIAL: Mutex<SerialPort> = Mutex::new(SerialPort::new(COM2_BASE));

/// Bring up the debug UART. Must be called once, early, before the first
/// `print!`/`serial_println!`.
pub fn init_debug_port() {
    SERIAL.lock().init();
}

/// Lock and return the debug UART writer, for use by the `print!` family
/// of macros.
pub fn writer() -> impl core::ops::DerefMut<Target = SerialPort> + 'static {
    SERIAL.lock()
}
