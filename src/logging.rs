//! Route `log` records to logcat on Android and to stderr elsewhere.

use std::sync::Once;

static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(install);
}

#[cfg(target_os = "android")]
fn install() {
    if log::set_logger(&logcat::LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Debug);
    }
}

#[cfg(not(target_os = "android"))]
fn install() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(cfg!(test))
        .try_init();
}

#[cfg(target_os = "android")]
mod logcat {
    use std::ffi::CString;

    use android_log_sys::{LogPriority, __android_log_write};
    use log::{Level, Log, Metadata, Record};

    pub static LOGGER: Logcat = Logcat;

    pub struct Logcat;

    impl Log for Logcat {
        fn enabled(&self, metadata: &Metadata) -> bool {
            metadata.level() <= log::max_level()
        }

        fn log(&self, record: &Record) {
            if !self.enabled(record.metadata()) {
                return;
            }
            let priority = match record.level() {
                Level::Error => LogPriority::ERROR,
                Level::Warn => LogPriority::WARN,
                Level::Info => LogPriority::INFO,
                Level::Debug => LogPriority::DEBUG,
                Level::Trace => LogPriority::VERBOSE,
            };
            let msg = CString::new(format!("{}", record.args()))
                .unwrap_or_else(|_| CString::from(c"<log msg had NUL>"));
            unsafe {
                __android_log_write(
                    priority as _,
                    c"esign-marker".as_ptr(),
                    msg.as_ptr(),
                );
            }
        }

        fn flush(&self) {}
    }
}
