/*
 * Demo task bodies: print, then yield or sleep, forever. None of them
 * ever return, so none of them ever touch the terminate-trap sentinel.
 */

use crate::kernel::syscall;
use crate::serial_println;

/// S1 - create and round-robin: three tasks of equal priority, each
/// printing its name and yielding, forever.
pub extern "C" fn round_robin_a() -> ! {
    loop {
        serial_println!("A");
        syscall::task_yield();
    }
}

pub extern "C" fn round_robin_b() -> ! {
    loop {
        serial_println!("B");
        syscall::task_yield();
    }
}

pub extern "C" fn round_robin_c() -> ! {
    loop {
        serial_println!("C");
        syscall::task_yield();
    }
}

/// S2 - sleep expiry: sleep for 5 ticks (~50ms at the 10ms tick period),
/// then print, forever.
pub extern "C" fn sleeper() -> ! {
    loop {
        syscall::task_sleep(5);
        serial_println!("woke");
    }
}

/// S3 - suspend/resume: Ping and Pong each sleep and print; Ctl
/// periodically suspends Pong for one cycle, then resumes it.
pub extern "C" fn ping() -> ! {
    loop {
        syscall::task_sleep(10);
        serial_println!("ping");
    }
}

pub extern "C" fn pong() -> ! {
    loop {
        syscall::task_sleep(10);
        serial_println!("pong");
    }
}

pub extern "C" fn ctl() -> ! {
    loop {
        syscall::task_sleep(10);
        let pong_pid = syscall::task_get_pid(pong);
        if pong_pid >= 0 {
            syscall::task_suspend(pong_pid as u32);
        }
        syscall::task_yield();
        syscall::task_sleep(10);
        if pong_pid >= 0 {
            syscall::task_resume(pong_pid as u32);
        }
        syscall::task_yield();
    }
}
