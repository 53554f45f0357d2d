//! Shared object-name generation.
//!
//! Every upload attempt gets a fresh `media/{uuid}.{ext}` name. Two
//! concurrent uploads therefore never share mutable state, and a retry can
//! never collide with the dead attempt it replaces.

use chancel_core::constants::MEDIA_KEY_PREFIX;
use uuid::Uuid;

/// Generate a unique object name for an upload attempt. Only the sanitized
/// extension of the original filename is preserved.
pub fn generate_object_name(filename: &str) -> String {
    match sanitized_extension(filename) {
        Some(ext) => format!("{}{}.{}", MEDIA_KEY_PREFIX, Uuid::new_v4(), ext),
        None => format!("{}{}", MEDIA_KEY_PREFIX, Uuid::new_v4()),
    }
}

/// Lowercased, alphanumeric-only extension, at most 8 characters. Anything
/// else is dropped rather than sanitized into something surprising.
fn sanitized_extension(filename: &str) -> Option<String> {
    let ext = filename.rsplit_once('.')?.1;
    if ext.is_empty()
        || ext.len() > 8
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_object_names_are_unique() {
        let names: HashSet<String> = (0..200)
            .map(|_| generate_object_name("sermon.mp4"))
            .collect();
        assert_eq!(names.len(), 200);
    }

    #[test]
    fn test_extension_preserved_and_lowercased() {
        let name = generate_object_name("Easter Service.MP4");
        assert!(name.starts_with(MEDIA_KEY_PREFIX));
        assert!(name.ends_with(".mp4"));
    }

    #[test]
    fn test_multi_dot_filename_keeps_last_extension() {
        let name = generate_object_name("archive.tar.gz");
        assert!(name.ends_with(".gz"));
    }

    #[test]
    fn test_unusable_extensions_are_dropped() {
        for filename in ["noext", "trailing.", "weird.e x t", "dots..", "long.extension123"] {
            let name = generate_object_name(filename);
            let rest = name.strip_prefix(MEDIA_KEY_PREFIX).unwrap();
            assert!(
                !rest.contains('.'),
                "expected no extension for {filename}, got {name}"
            );
        }
    }

    #[test]
    fn test_original_filename_never_leaks_into_object_name() {
        let name = generate_object_name("../../etc/passwd.mp4");
        assert!(!name.contains(".."));
        assert!(!name.contains("passwd"));
    }
}
