//! Server-side rendering of the form page.

use crate::feature_vector::{FeatureSet, PremiumTable};

const TEMPLATE: &str = include_str!("../templates/index.html");

pub const SCRIPT: &str = include_str!("../static/js/main.js");

/// Escape text for use in HTML element content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn amenity_label(field: &str) -> &str {
    match field {
        "CarParking" => "Car parking",
        "SwimmingPool" => "Swimming pool",
        "24X7Security" => "24x7 security",
        "PowerBackup" => "Power backup",
        "Resale" => "Resale property",
        other => other,
    }
}

/// Render the form, with the prediction banner when one is given
pub fn render_page(premiums: &PremiumTable, feature_set: FeatureSet, prediction: Option<&str>) -> String {
    let location_options: String = premiums
        .locations()
        .map(|loc| {
            let loc = escape_html(loc);
            format!("        <option value=\"{loc}\">{loc}</option>\n")
        })
        .collect();

    let numeric_extras: String = feature_set
        .numeric_fields()
        .iter()
        .filter(|f| !matches!(**f, "Area" | "Bedrooms"))
        .map(|f| {
            format!(
                "      <label for=\"{f}\">{f}</label>\n      <input id=\"{f}\" type=\"number\" name=\"{f}\" step=\"any\">\n"
            )
        })
        .collect();

    let amenities: String = feature_set
        .flag_fields()
        .iter()
        .map(|f| {
            format!(
                "      <label><input type=\"checkbox\" name=\"{f}\" value=\"1\"> {}</label>\n",
                amenity_label(f)
            )
        })
        .collect();

    let prediction = prediction
        .map(|text| format!("  <div class=\"prediction\">{}</div>", escape_html(text)))
        .unwrap_or_default();

    TEMPLATE
        .replace("{{location_options}}", location_options.trim_end_matches('\n'))
        .replace("{{numeric_extras}}", numeric_extras.trim_end_matches('\n'))
        .replace("{{amenities}}", amenities.trim_end_matches('\n'))
        .replace("{{prediction}}", &prediction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html("<b>\"Tom & Jerry's\"</b>"),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn blank_page_has_no_banner_and_lists_locations() {
        let html = render_page(&PremiumTable::default(), FeatureSet::Classic, None);
        assert!(!html.contains("class=\"prediction\""));
        assert!(html.contains("<option value=\"Vasant Kunj\">Vasant Kunj</option>"));
        assert!(html.contains("name=\"SwimmingPool\""));
        assert!(!html.contains("name=\"PowerBackup\""));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn extended_page_offers_extra_fields() {
        let html = render_page(&PremiumTable::default(), FeatureSet::Extended, None);
        assert!(html.contains("name=\"24X7Security\""));
        assert!(html.contains("name=\"FeatureScore\""));
    }

    #[test]
    fn prediction_text_is_escaped_into_banner() {
        let html = render_page(
            &PremiumTable::default(),
            FeatureSet::Classic,
            Some("🏠 Estimated Price in <script>: ₹1.00"),
        );
        assert!(html.contains("Estimated Price in &lt;script&gt;: ₹1.00"));
    }
}
