//! Process-wide "pipe this stream" marker.

use std::fmt;
use std::ptr;
use std::sync::LazyLock;

use tracing::debug;

static INSTANCE: LazyLock<Pipe> = LazyLock::new(|| {
    debug!("pipe placeholder initialized");
    Pipe {
        label: concat!(module_path!(), "::Pipe"),
    }
});

/// Marker asking [`ExternalCommand::invoke`](crate::ExternalCommand::invoke)
/// to connect a standard stream through an anonymous pipe.
///
/// Exactly one value exists per process; compare by identity.
#[derive(Debug)]
pub struct Pipe {
    label: &'static str,
}

impl Pipe {
    pub fn instance() -> &'static Pipe {
        &INSTANCE
    }

    pub fn is(&self, other: &Pipe) -> bool {
        ptr::eq(self, other)
    }
}

impl PartialEq for Pipe {
    fn eq(&self, other: &Self) -> bool {
        self.is(other)
    }
}

impl Eq for Pipe {}

impl fmt::Display for Pipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn instance_is_identical_across_calls() {
        let a = Pipe::instance();
        let b = Pipe::instance();
        assert!(a.is(b));
        assert!(ptr::eq(a, b));
        assert_eq!(a, b);
    }

    #[test]
    fn concurrent_first_access_yields_one_instance() {
        let addrs: Vec<usize> = (0..8)
            .map(|_| thread::spawn(|| ptr::from_ref(Pipe::instance()) as usize))
            .collect::<Vec<_>>()
            .into_iter()
            .map(|handle| handle.join().expect("join"))
            .collect();
        assert!(addrs.windows(2).all(|pair| pair[0] == pair[1]));
    }

    #[test]
    fn displays_qualified_name() {
        assert_eq!(Pipe::instance().to_string(), "toolattr::io::pipe::Pipe");
    }
}
