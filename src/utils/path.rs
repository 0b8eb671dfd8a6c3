//! Virtual output-tree paths.
//!
//! Artifact file names are `/`-separated strings whose final location is only
//! known to the host at emission time. Everything here works on those strings
//! directly, never on the OS path type, so results are identical on every
//! platform.
//!
//! # Relative paths
//!
//! | from              | to                     | result                    |
//! |-------------------|------------------------|---------------------------|
//! | `a.js`            | `styles/a/index.css`   | `./styles/a/index.css`    |
//! | `styles/a/x.js`   | `styles/a/index.css`   | `./index.css`             |
//! | `lib/a.js`        | `styles/a/index.css`   | `../styles/a/index.css`   |

/// Split a path into normalized segments rooted at the virtual root.
///
/// Empty and `.` segments are dropped, `..` pops the previous segment and
/// never climbs above the root.
fn segments(path: &str) -> Vec<&str> {
    let mut out = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                out.pop();
            }
            part => out.push(part),
        }
    }
    out
}

/// Normalize a virtual path onto the virtual root.
///
/// The result has no leading slash, e.g. `./styles//a/../b.css` → `styles/b.css`.
pub fn normalize(path: &str) -> String {
    segments(path).join("/")
}

/// Directory part of a normalized virtual path (empty for the root).
pub fn dirname(path: &str) -> String {
    let segs = segments(path);
    match segs.split_last() {
        Some((_, dir)) => dir.join("/"),
        None => String::new(),
    }
}

/// Resolve `rel` against the directory `dir`.
pub fn join(dir: &str, rel: &str) -> String {
    if dir.is_empty() {
        normalize(rel)
    } else {
        normalize(&format!("{dir}/{rel}"))
    }
}

/// Compute the import path that leads from the file `from` to the file `to`.
///
/// Resolving the result against `dirname(from)` yields `to`. Files in the same
/// directory always produce `./<basename>`; targets below the source directory
/// are prefixed with `./` so the result is never mistaken for a bare specifier.
pub fn relative(from: &str, to: &str) -> String {
    let from_segs = segments(from);
    let from_dir = match from_segs.split_last() {
        Some((_, dir)) => dir,
        None => &[][..],
    };
    let to_segs = segments(to);
    let (to_base, to_dir) = match to_segs.split_last() {
        Some((base, dir)) => (*base, dir),
        None => return ".".to_owned(),
    };

    if from_dir == to_dir {
        return format!("./{to_base}");
    }

    let common = from_dir
        .iter()
        .zip(to_dir.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let ups = from_dir.len() - common;

    let mut parts: Vec<&str> = std::iter::repeat_n("..", ups).collect();
    parts.extend_from_slice(&to_segs[common..]);

    if ups == 0 {
        format!("./{}", parts.join("/"))
    } else {
        parts.join("/")
    }
}
