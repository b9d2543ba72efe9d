#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => ({
        use core::fmt::Write;
        let _ = $crate::arch::x86_64::serial::writer().write_fmt(format_args!($($arg)*));
    });
}

/// Print with new line to the debug console
#[macro_export]
macro_rules! serial_println {
    () => (print!("\n"));
    ($fmt:expr) => (print!(concat!($fmt, "\n")));
    ($fmt:expr, $($arg:tt)*) => (print!(concat!($fmt, "\n"), $($arg)*));
}
