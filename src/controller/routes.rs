use crate::error::{Result, RoutewireError};
use crate::metadata::HttpMethod;

#[derive(Debug, Clone)]
struct RouteEntry {
    method: HttpMethod,
    path: String,
    controller: &'static str,
}

/// Every verb + full path mapped so far, shared by all controllers mounted
/// on one router.
///
/// Rejects what axum would refuse when routes are merged: an overlapping
/// verb on the same path, and two paths that capture differently at the
/// same position (`/{id}` next to `/{name}/x`).
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, method: HttpMethod, path: &str, controller: &'static str) -> Result<()> {
        for entry in &self.entries {
            if entry.path == path {
                if entry.method.overlaps(method) {
                    return Err(RoutewireError::DuplicateRoute {
                        method: method.to_string(),
                        path: path.to_string(),
                        controller: controller.to_string(),
                        existing: entry.controller.to_string(),
                    });
                }
            } else if captures_clash(&entry.path, path) {
                return Err(RoutewireError::ConflictingRoute {
                    path: path.to_string(),
                    existing: entry.path.clone(),
                    controller: controller.to_string(),
                });
            }
        }

        self.entries.push(RouteEntry {
            method,
            path: path.to_string(),
            controller,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_capture(segment: &str) -> bool {
    segment.starts_with('{') && segment.ends_with('}') && !segment.starts_with("{{")
}

/// True when the paths agree up to a position where both capture, under
/// different names or kinds.
fn captures_clash(left: &str, right: &str) -> bool {
    for (a, b) in left.split('/').zip(right.split('/')) {
        if a != b {
            return is_capture(a) && is_capture(b);
        }
    }
    false
}
