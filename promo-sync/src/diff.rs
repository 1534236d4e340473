//! Unified diff between a remote promotion and a local settings file, for
//! `promo diff`.

use similar::TextDiff;

use promo_core::PromotionSettings;

use crate::remote::{parse_date_prefix, RemotePromotion};

/// Render the comparable part of a remote promotion as text.
pub fn render_remote(remote: &RemotePromotion) -> String {
    let mut segments: Vec<_> = remote.segments.iter().collect();
    segments.sort_by_key(|s| s.order_index);
    let listing: Vec<(String, String)> = segments
        .iter()
        .map(|s| (s.name.clone(), s.category.clone()))
        .collect();

    render(&Fields {
        name: &remote.name,
        description: &remote.description,
        theme: &remote.theme,
        date_from: date_text(&remote.date_from),
        date_to: date_text(&remote.date_to),
        pricing_model: &remote.pricing_model,
        identification_mode: &remote.identification_mode,
        slot_count: remote.slot_count,
        discount: remote.discount,
        segments: &listing,
    })
}

/// Render a settings file the same way as [`render_remote`].
pub fn render_local(settings: &PromotionSettings) -> String {
    let listing: Vec<(String, String)> = settings
        .segments
        .iter()
        .map(|s| (s.name.clone(), s.category.clone()))
        .collect();
    let pricing = settings.pricing_model.to_string();
    let mode = settings.identification_mode.to_string();

    render(&Fields {
        name: &settings.name,
        description: &settings.description,
        theme: &settings.theme,
        date_from: settings.start_date.map(|d| d.to_string()).unwrap_or_default(),
        date_to: settings.end_date.map(|d| d.to_string()).unwrap_or_default(),
        pricing_model: &pricing,
        identification_mode: &mode,
        slot_count: settings.slot_count,
        discount: settings.min_discount,
        segments: &listing,
    })
}

/// Unified diff from the remote state to the settings file.
///
/// Returns `None` when both render identically.
pub fn diff_promotion(
    remote: &RemotePromotion,
    settings: &PromotionSettings,
    label: &str,
) -> Option<String> {
    let old = render_remote(remote);
    let new = render_local(settings);
    if old == new {
        return None;
    }
    let old_header = format!("a/remote/{label}");
    let new_header = format!("b/{label}");
    Some(
        TextDiff::from_lines(&old, &new)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string(),
    )
}

struct Fields<'a> {
    name: &'a str,
    description: &'a str,
    theme: &'a str,
    date_from: String,
    date_to: String,
    pricing_model: &'a str,
    identification_mode: &'a str,
    slot_count: u32,
    discount: u32,
    segments: &'a [(String, String)],
}

fn render(f: &Fields<'_>) -> String {
    let mut out = String::new();
    out.push_str(&format!("name: {}\n", f.name));
    out.push_str(&format!("description: {}\n", f.description));
    out.push_str(&format!("theme: {}\n", f.theme));
    out.push_str(&format!("date_from: {}\n", f.date_from));
    out.push_str(&format!("date_to: {}\n", f.date_to));
    out.push_str(&format!("pricing_model: {}\n", f.pricing_model));
    out.push_str(&format!("identification_mode: {}\n", f.identification_mode));
    out.push_str(&format!("slot_count: {}\n", f.slot_count));
    out.push_str(&format!("discount: {}\n", f.discount));
    out.push_str("segments:\n");
    for (index, (name, category)) in f.segments.iter().enumerate() {
        out.push_str(&format!("  {}. {name} [{category}]\n", index + 1));
    }
    out
}

fn date_text(value: &str) -> String {
    parse_date_prefix(value)
        .map(|d| d.to_string())
        .unwrap_or_default()
}
