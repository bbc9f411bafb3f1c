//! Console output. Lines are formatted with `ufmt` into a fixed buffer and
//! handed to whatever sink the board installed with `set_console`.

use core::cell::Cell;
use critical_section::Mutex;

/// Longest line the macros will format; the rest is cut off
pub const LINE_CAPACITY: usize = 96;

static CONSOLE: Mutex<Cell<Option<fn(&str)>>> = Mutex::new(Cell::new(None));

/// Install the sink that receives every console line, e.g. a serial writer
pub fn set_console(sink: fn(&str)) {
    critical_section::with(|critical_section| CONSOLE.borrow(critical_section).set(Some(sink)));
}

/// Remove the sink; lines are dropped until a new one is set
pub fn clear_console() {
    critical_section::with(|critical_section| CONSOLE.borrow(critical_section).set(None));
}

#[doc(hidden)]
pub fn emit(line: &str) {
    let sink = critical_section::with(|critical_section| CONSOLE.borrow(critical_section).get());
    if let Some(sink) = sink {
        sink(line);
    }
}

macro_rules! println {
    ($($arg:tt)*) => {{
        let mut line: heapless::String<{ $crate::console::LINE_CAPACITY }> =
            heapless::String::new();
        // A full buffer only truncates the line
        let _ = ufmt::uwrite!(&mut line, $($arg)*);
        $crate::console::emit(line.as_str());
    }};
}

macro_rules! debug {
    ($($arg:tt)*) => {{
        #[cfg(feature = "debug")]
        $crate::console::println!($($arg)*);
    }};
}

macro_rules! trace {
    ($($arg:tt)*) => {{
        #[cfg(feature = "trace")]
        $crate::console::println!($($arg)*);
    }};
}

pub(crate) use {debug, println, trace};
