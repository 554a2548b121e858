//! Narrative composition for all three response paths.

use rand::Rng;

use crate::dataset::Country;
use crate::item::SearchItem;
use crate::planner::{AfricaRelevance, Analysis};
use crate::tokenizer::{format_list, strip_html, truncate_chars};

pub const BUSINESS_THEMES: [&str; 6] = [
    "showing remarkable growth and innovation in",
    "leading the continent in business development and",
    "demonstrating exceptional progress in",
    "pioneering new opportunities in",
    "showcasing Africa's potential through",
    "emerging as a leader in",
];

const DEEP_CLOSING: &str = "Africa continues to demonstrate remarkable resilience and innovation, \
offering exceptional opportunities for investment, partnership, and growth. \
The continent's diverse economies, young population, and entrepreneurial spirit \
position it as a leading destination for high-value business opportunities.";

const TEMPLATE_CLOSING: &str = "The African continent continues to demonstrate resilience, innovation, and tremendous growth potential, \
making it an ideal destination for investment and partnership opportunities. \
With a young and dynamic population, abundant natural resources, and increasing digital connectivity, \
Africa represents one of the world's most promising markets for sustainable business growth.";

/// Picks the opener index for templated narratives.
pub trait ThemeChooser: Send + Sync {
    fn choose(&self, len: usize) -> usize;
}

pub struct RandomTheme;

impl ThemeChooser for RandomTheme {
    fn choose(&self, len: usize) -> usize {
        if len == 0 { return 0; }
        rand::thread_rng().gen_range(0..len)
    }
}

/// Always picks the same theme (modulo the number of themes).
pub struct FixedTheme(pub usize);

impl ThemeChooser for FixedTheme {
    fn choose(&self, len: usize) -> usize {
        if len == 0 { 0 } else { self.0 % len }
    }
}

pub fn format_country_list<S: AsRef<str>>(names: &[S]) -> String {
    format_list(names)
}

fn affirmations(out: &mut String, countries: &[&Country]) {
    for c in countries.iter().take(3) {
        out.push_str(&format!("{} {} ", c.name, c.positive_affirmation));
    }
}

/// Stage 6 of deep thinking.
pub fn deep_narrative(query: &str, analysis: &Analysis, relevance: &AfricaRelevance) -> String {
    let mut out = format!("Based on comprehensive analysis of \"{query}\", ");

    let countries: Vec<&Country> = if analysis.countries_with_links.is_empty() {
        relevance.relevant_countries.iter().collect()
    } else {
        analysis.countries_with_links.iter().map(|c| &c.country).collect()
    };
    if !countries.is_empty() {
        let names: Vec<&str> = countries.iter().map(|c| c.name.as_str()).collect();
        out.push_str(&format!("this topic is particularly relevant to {}. ", format_country_list(&names)));
    }

    let insights: Vec<&str> = analysis.insights.iter().take(3).map(String::as_str).collect();
    let insight_text = truncate_chars(&insights.join(". "), 200);
    if !insight_text.is_empty() {
        out.push_str(&format!("Key insights reveal: {insight_text}. "));
    }

    affirmations(&mut out, &countries);

    let trends: Vec<&str> = analysis.trends.iter().take(2).map(String::as_str).collect();
    if !trends.is_empty() {
        out.push_str(&format!("Current trends indicate: {}. ", trends.join(", ")));
    }

    out.push_str(DEEP_CLOSING);
    out
}

fn template_intro(query: &str, countries: &[&Country], themes: &dyn ThemeChooser) -> String {
    let theme = BUSINESS_THEMES[themes.choose(BUSINESS_THEMES.len()) % BUSINESS_THEMES.len()];
    let mut out = format!("Africa is {theme} {query}. ");
    if !countries.is_empty() {
        let names: Vec<&str> = countries.iter().map(|c| c.name.as_str()).collect();
        out.push_str(&format!("This is particularly evident in countries like {} ", format_country_list(&names)));
        out.push_str("where innovation meets opportunity across various sectors including ");
        let mut sectors: Vec<&str> = Vec::new();
        for c in countries {
            for s in &c.key_sectors {
                if !sectors.contains(&s.as_str()) { sectors.push(s); }
            }
        }
        sectors.truncate(4);
        if !sectors.is_empty() {
            out.push_str(&sectors.join(", "));
            out.push_str(". ");
        }
    }
    out
}

/// Single-pass narrative: themed opener, countries, sectors, search snippets, closing.
pub fn template_narrative(query: &str, items: &[SearchItem], countries: &[Country], themes: &dyn ThemeChooser) -> String {
    let refs: Vec<&Country> = countries.iter().collect();
    let mut out = template_intro(query, &refs, themes);
    affirmations(&mut out, &refs);

    let snippets: Vec<&str> = items
        .iter()
        .take(3)
        .map(|i| i.description.as_str())
        .filter(|d| !d.is_empty())
        .collect();
    if !snippets.is_empty() {
        let clean = truncate_chars(&strip_html(&snippets.join(" ")), 300);
        out.push_str(&format!("Current information indicates: {clean}... "));
    }

    out.push_str(TEMPLATE_CLOSING);
    out
}

/// Network-free narrative used by the last-resort response.
pub fn local_narrative(query: &str, countries: &[Country], themes: &dyn ThemeChooser) -> String {
    let refs: Vec<&Country> = countries.iter().collect();
    let mut out = template_intro(query, &refs, themes);
    affirmations(&mut out, &refs);
    out.push_str(TEMPLATE_CLOSING);
    out
}
