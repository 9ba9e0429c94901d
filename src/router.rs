use crate::Response;

/// The byte that must follow a matched prefix: ASCII space.
const SEPARATOR: u8 = 0x20;

struct RouteEntry {
    prefix: Vec<u8>,
    handler: Box<dyn Fn(&[u8]) -> Response + Send + Sync>,
}

/// Outcome of matching a possibly-partial request buffer.
#[allow(clippy::module_name_repetitions)]
pub enum RouteResult {
    /// Some entry matched; this is its handler's response.
    Response(Response),
    /// Every entry is conclusively ruled out.
    NotFound,
    /// No entry matched yet, but at least one could still match
    /// once more bytes arrive.
    Incomplete,
}

/// Ordered table of `(prefix bytes, handler)` pairs.
///
/// Built once before the workers start and read-only afterwards, so
/// workers share it without synchronization.
pub struct Router {
    entries: Vec<RouteEntry>,
}
impl Router {
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends an entry.  Registration order is match priority: the first
    /// matching entry wins.
    ///
    /// The caller must not register a prefix that is itself a prefix of
    /// another registered entry; this is not enforced here.
    pub fn add_route<F>(&mut self, prefix: impl Into<Vec<u8>>, handler: F)
    where
        F: Fn(&[u8]) -> Response + Send + Sync + 'static,
    {
        self.entries.push(RouteEntry {
            prefix: prefix.into(),
            handler: Box::new(handler),
        });
    }

    /// Matches the leading bytes of `buf` against each entry.
    ///
    /// `buf` may hold only part of the request.  An entry stays undecided
    /// while every received byte equals the corresponding prefix byte but
    /// the separator byte has not arrived yet.  An entry whose received
    /// bytes already mismatch is ruled out, even when `buf` is shorter
    /// than its prefix.
    #[must_use]
    pub fn route(&self, buf: &[u8]) -> RouteResult {
        let mut num_undecided = 0;
        for entry in &self.entries {
            let prefix = entry.prefix.as_slice();
            let compared = prefix.len().min(buf.len());
            if buf[..compared] != prefix[..compared] {
                continue;
            }
            if buf.len() <= prefix.len() {
                // Matches so far.  Needs the rest of the prefix, or the
                // separator byte after it.
                num_undecided += 1;
                continue;
            }
            if buf[prefix.len()] == SEPARATOR {
                return RouteResult::Response((entry.handler)(buf));
            }
        }
        if num_undecided > 0 {
            RouteResult::Incomplete
        } else {
            RouteResult::NotFound
        }
    }
}
