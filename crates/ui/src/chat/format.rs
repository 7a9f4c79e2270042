use zova_llm::MediaKind;

use crate::chat::attachment::Attachment;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Formats a byte count with binary units, e.g. `1536` as `1.5 KB`.
pub fn format_byte_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let exponent = (bytes.ilog(1024) as usize).min(SIZE_UNITS.len() - 1);
    let value = bytes as f64 / 1024_f64.powi(exponent as i32);
    let mut rounded = format!("{value:.2}");
    if rounded.contains('.') {
        let trimmed = rounded.trim_end_matches('0').trim_end_matches('.').len();
        rounded.truncate(trimmed);
    }

    format!("{rounded} {}", SIZE_UNITS[exponent])
}

pub fn media_glyph(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Image => "🖼️",
        MediaKind::Audio => "🎵",
        MediaKind::Pdf => "📝",
        MediaKind::Other => "📄",
    }
}

/// Line shown under a sent message for each attachment.
pub fn attachment_line(attachment: &Attachment) -> String {
    format!(
        "📎 {} ({})",
        attachment.name,
        format_byte_size(attachment.size)
    )
}

/// Line shown for the attachment staged in the composer.
pub fn pending_attachment_line(attachment: &Attachment) -> String {
    format!("{} {}", media_glyph(attachment.kind()), attachment.name)
}
