//! File name and extension helpers shared by every flow.
//!
//! Keys and URLs may come from Windows or POSIX tools, so both separators are accepted.

/// Final path segment after splitting on `/` and `\`.
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Lower-cased text after the last `.` of the file name.
///
/// Returns `None` when the name has no `.` or ends with one.
pub fn file_extension(path: &str) -> Option<String> {
    let (_, ext) = file_name(path).rsplit_once('.')?;
    if ext.is_empty() {
        None
    } else {
        Some(ext.to_lowercase())
    }
}
