use time::macros::format_description;
use time::OffsetDateTime;

/// Editor modelines prepended to every generated file.
pub const MODELINES_HEADER: &str = "# vim: set ft=requirements :\n";

/// Render the generated-file header block.
///
/// Layout is fixed: modelines, the `Generated by` stamp, nested constraint
/// references, nested requirement references, the primary index URL, then
/// extra index URLs. Nested references are sorted so regeneration is
/// deterministic.
pub fn build_source_header(
    index_url: Option<&str>,
    extra_index_urls: &[String],
    nested_cfiles: &[String],
    nested_rfiles: &[String],
    timestamp: OffsetDateTime,
) -> String {
    let mut header = String::from(MODELINES_HEADER);
    let stamp = timestamp
        .format(format_description!(
            "[weekday repr:short] [month repr:short] [day padding:space] [hour]:[minute]:[second] [year]"
        ))
        .unwrap_or_default();
    header.push_str("# Generated by reqwire on ");
    header.push_str(&stamp);
    header.push('\n');

    let mut cfiles: Vec<&String> = nested_cfiles.iter().collect();
    cfiles.sort();
    for reference in cfiles {
        header.push_str("-c ");
        header.push_str(reference);
        header.push('\n');
    }
    let mut rfiles: Vec<&String> = nested_rfiles.iter().collect();
    rfiles.sort();
    for reference in rfiles {
        header.push_str("-r ");
        header.push_str(reference);
        header.push('\n');
    }

    if let Some(index_url) = index_url {
        header.push_str("--index-url ");
        header.push_str(index_url);
        header.push('\n');
    }
    for extra in extra_index_urls {
        header.push_str("--extra-index-url ");
        header.push_str(extra);
        header.push('\n');
    }
    header
}
