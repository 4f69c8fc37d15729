//! Deprecation diagnostics for aliased tags.
//!
//! Notices are never errors. Each one is logged through the `log` facade
//! under the `estibase::deprecation` target and handed to every capture
//! scope active on the current thread.

use std::cell::RefCell;
use std::fmt;

pub const DEPRECATION_TARGET: &str = "estibase::deprecation";

/// A deprecated tag was read or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    pub tag: String,
    pub version: String,
    pub replacement: Option<String>,
}

impl fmt::Display for DeprecationNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag '{}' will be removed in version {}", self.tag, self.version)?;
        match &self.replacement {
            Some(new_tag) => write!(
                f,
                " and replaced by '{new_tag}', please use '{new_tag}' instead"
            ),
            None => write!(
                f,
                ", please remove code that accesses or sets '{}'",
                self.tag
            ),
        }
    }
}

thread_local! {
    static CAPTURE_STACK: RefCell<Vec<Vec<DeprecationNotice>>> = const { RefCell::new(Vec::new()) };
}

pub(crate) fn emit(notice: DeprecationNotice) {
    log::warn!(target: DEPRECATION_TARGET, "{notice}");
    CAPTURE_STACK.with(|stack| {
        for scope in stack.borrow_mut().iter_mut() {
            scope.push(notice.clone());
        }
    });
}

struct CaptureGuard {
    depth: usize,
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        CAPTURE_STACK.with(|stack| stack.borrow_mut().truncate(self.depth));
    }
}

/// Runs `f` and returns every deprecation notice emitted on this thread
/// while it ran. Scopes nest; an outer scope also sees inner notices.
pub fn capture_deprecations<R>(f: impl FnOnce() -> R) -> (R, Vec<DeprecationNotice>) {
    let depth = CAPTURE_STACK.with(|stack| {
        let mut stack = stack.borrow_mut();
        stack.push(Vec::new());
        stack.len() - 1
    });
    let guard = CaptureGuard { depth };
    let result = f();
    let notices = CAPTURE_STACK.with(|stack| {
        stack
            .borrow_mut()
            .get_mut(depth)
            .map(std::mem::take)
            .unwrap_or_default()
    });
    drop(guard);
    (result, notices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice(tag: &str) -> DeprecationNotice {
        DeprecationNotice {
            tag: tag.to_string(),
            version: "2.0.0".to_string(),
            replacement: Some("new_tag".to_string()),
        }
    }

    #[test]
    fn test_message_with_replacement() {
        let msg = notice("old_tag").to_string();
        assert!(msg.contains("'old_tag'"));
        assert!(msg.contains("2.0.0"));
        assert!(msg.contains("please use 'new_tag' instead"));
    }

    #[test]
    fn test_message_for_removed_tag() {
        let removed = DeprecationNotice {
            tag: "gone".to_string(),
            version: "1.5".to_string(),
            replacement: None,
        };
        assert_eq!(
            removed.to_string(),
            "tag 'gone' will be removed in version 1.5, please remove code that accesses or sets 'gone'"
        );
    }

    #[test]
    fn test_nested_capture_scopes() {
        let ((), outer) = capture_deprecations(|| {
            emit(notice("a"));
            let ((), inner) = capture_deprecations(|| emit(notice("b")));
            assert_eq!(inner.len(), 1);
            assert_eq!(inner[0].tag, "b");
        });
        assert_eq!(outer.len(), 2);
    }

    #[test]
    fn test_no_capture_outside_scope() {
        emit(notice("ignored"));
        let ((), captured) = capture_deprecations(|| ());
        assert!(captured.is_empty());
    }
}
