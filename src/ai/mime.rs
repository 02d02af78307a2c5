pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, ..] => "image/png",
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => "image/webp",
        _ => {
            tracing::warn!(
                "Unrecognized image format (first 4 bytes: {:02X?}), falling back to image/jpeg",
                &bytes[..bytes.len().min(4)]
            );
            "image/jpeg"
        }
    }
}

/// Keep the client's declared type unless it lacks a concrete subtype
/// (`image/`, `image/*`), in which case sniff the bytes.
pub fn resolve_image_mime(declared: &str, bytes: &[u8]) -> String {
    let declared = declared.trim();
    match declared.split_once('/') {
        Some((_, subtype)) if !subtype.is_empty() && subtype != "*" => declared.to_string(),
        _ => detect_image_mime(bytes).to_string(),
    }
}
