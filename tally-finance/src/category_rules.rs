//! Deterministic merchant rules mapping statement descriptions to a
//! (category, subcategory) pair.
//!
//! Rules are checked top to bottom and the first hit wins, so order encodes
//! priority between overlapping keywords ("uber eats" must beat "uber").

use tally_core::{DEFAULT_CATEGORY, DEFAULT_SUBCATEGORY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Classification {
    pub category: &'static str,
    pub subcategory: &'static str,
}

impl Classification {
    pub const fn new(category: &'static str, subcategory: &'static str) -> Self {
        Self {
            category,
            subcategory,
        }
    }

    pub fn is_default(&self) -> bool {
        *self == DEFAULT_CLASSIFICATION
    }
}

pub const DEFAULT_CLASSIFICATION: Classification =
    Classification::new(DEFAULT_CATEGORY, DEFAULT_SUBCATEGORY);

pub struct CategoryRule {
    pub class: Classification,
    pub keywords: &'static [&'static str],
}

const fn rule(
    category: &'static str,
    subcategory: &'static str,
    keywords: &'static [&'static str],
) -> CategoryRule {
    CategoryRule {
        class: Classification::new(category, subcategory),
        keywords,
    }
}

/// Collapsed keywords shorter than this are too ambiguous to match inside
/// collapsed text ("gull" sits inside "seagulls").
const MIN_COLLAPSED_KEYWORD_LEN: usize = 5;

pub static CATEGORY_RULES: &[CategoryRule] = &[
    rule("Food & Dining", "Delivery", &["uber eats", "ubereats", "doordash", "delivereasy", "menulog"]),
    rule("Groceries", "Supermarket", &[
        "countdown", "woolworths", "new world", "pak n save", "paknsave", "pak'n save",
        "fresh choice", "freshchoice", "four square", "supervalue", "farro",
    ]),
    rule("Groceries", "Specialty", &["butcher", "bakery", "fruit world", "the fruit", "liquorland", "super liquor"]),
    rule("Food & Dining", "Fast Food", &[
        "mcdonalds", "mcdonald's", "kfc", "burger king", "subway", "domino", "hell pizza",
        "pizza hut", "carl's jr", "wendys", "taco bell",
    ]),
    rule("Food & Dining", "Cafes", &["cafe", "café", "coffee", "espresso", "starbucks", "mojo"]),
    rule("Food & Dining", "Restaurants", &["restaurant", "sushi", "ramen", "dumpling", "bistro", "eatery", "kitchen", "thai", "noodle"]),
    rule("Transport", "Fuel", &["z energy", "waitomo", "mobil", "caltex", "gull ", "npd", "bp connect", "bp 2go", "challenge fuel"]),
    rule("Transport", "Public Transport", &["at hop", "at metro", "snapper", "metlink", "intercity"]),
    rule("Transport", "Rideshare", &["uber", "ola ", "zoomy", "didi"]),
    rule("Transport", "Parking", &["parking", "wilson park", "care park", "tournament park"]),
    rule("Technology", "AI Tools", &["openai", "chatgpt", "anthropic", "claude.ai", "midjourney", "perplexity"]),
    rule("Subscriptions", "Streaming", &["netflix", "spotify", "disney plus", "disney+", "neon", "youtube", "apple music", "amazon prime", "sky tv"]),
    rule("Technology", "Software", &["github", "microsoft", "adobe", "google", "apple.com", "icloud", "dropbox", "notion", "atlassian", "jetbrains", "digitalocean", "aws"]),
    rule("Utilities", "Mobile & Internet", &["spark", "one nz", "vodafone", "2degrees", "skinny", "slingshot", "orcon"]),
    rule("Utilities", "Power & Gas", &["mercury", "genesis", "contact energy", "meridian", "trustpower", "flick electric", "electric kiwi"]),
    rule("Utilities", "Water", &["watercare", "wellington water"]),
    rule("Health", "Pharmacy", &["chemist", "pharmacy", "unichem", "life pharmacy", "bargain chemist"]),
    rule("Health", "Medical", &["medical", "dental", "dentist", "physio", "doctor", "health", "optometrist", "specsavers"]),
    rule("Health", "Fitness", &["les mills", "snap fitness", "anytime fitness", "city fitness", "gym"]),
    rule("Travel", "Flights", &["air nz", "air new zealand", "airnz", "jetstar", "qantas", "virgin australia", "emirates"]),
    rule("Travel", "Accommodation", &["airbnb", "booking.com", "hotel", "motel", "hostel", "expedia", "holiday inn"]),
    rule("Entertainment", "Movies & Events", &["event cinemas", "hoyts", "reading cinemas", "ticketek", "ticketmaster", "eventfinda"]),
    rule("Entertainment", "Games", &["steam", "playstation", "xbox", "nintendo", "epic games"]),
    rule("Home & Garden", "Hardware", &["bunnings", "mitre 10", "mitre10", "placemakers", "kings plant", "oderings"]),
    rule("Shopping", "Online", &["mighty ape", "amazon", "aliexpress", "temu", "trade me", "trademe", "ebay", "shein"]),
    rule("Shopping", "Department Stores", &["the warehouse", "warehouse stationery", "kmart", "farmers", "briscoes", "smiths city"]),
    rule("Shopping", "Electronics", &["noel leeming", "jb hi-fi", "jb hifi", "harvey norman", "pb tech", "apple store"]),
    rule("Shopping", "Clothing", &["hallensteins", "glassons", "cotton on", "uniqlo", "h&m", "rebel sport", "kathmandu", "macpac"]),
    rule("Fees & Charges", "Bank Fees", &["interest charge", "late payment fee", "annual fee", "account fee", "overseas transaction fee", "card fee"]),
    rule("Government", "Services", &["nzta", "waka kotahi", "ird ", "inland revenue", "city council", "district council"]),
];

/// Sub-merchants behind a PayPal descriptor that deserve a more specific bucket
/// than the general rules would give them.
pub static PAYPAL_OVERRIDES: &[(&str, Classification)] = &[
    ("mighty ape", Classification::new("Shopping", "Games & Toys")),
    ("ebay", Classification::new("Shopping", "Marketplace")),
    ("aliexpress", Classification::new("Shopping", "Marketplace")),
    ("steam", Classification::new("Entertainment", "Games")),
    ("spotify", Classification::new("Subscriptions", "Streaming")),
    ("netflix", Classification::new("Subscriptions", "Streaming")),
    ("uber", Classification::new("Transport", "Rideshare")),
    ("airbnb", Classification::new("Travel", "Accommodation")),
];

/// Lowercase with runs of whitespace folded to one space.
pub fn normalize(description: &str) -> String {
    description
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Only letters and digits survive; tolerates "C O U N T D O W N" style extraction.
pub fn collapse(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

fn keyword_matches(keyword: &str, normalized: &str, collapsed: &str) -> bool {
    if normalized.contains(keyword) {
        return true;
    }
    let k = collapse(keyword);
    k.len() >= MIN_COLLAPSED_KEYWORD_LEN && collapsed.contains(&k)
}

fn match_rules(normalized: &str) -> Option<Classification> {
    let collapsed = collapse(normalized);
    CATEGORY_RULES
        .iter()
        .find(|r| r.keywords.iter().any(|k| keyword_matches(k, normalized, &collapsed)))
        .map(|r| r.class)
}

fn strip_paypal(normalized: &str) -> &str {
    normalized
        .strip_prefix("paypal")
        .unwrap_or(normalized)
        .trim_start_matches(|c: char| c == '*' || c.is_whitespace())
}

fn paypal_override(merchant: &str) -> Option<Classification> {
    let collapsed = collapse(merchant);
    PAYPAL_OVERRIDES
        .iter()
        .find(|(name, _)| merchant.starts_with(name) || collapsed.starts_with(&collapse(name)))
        .map(|(_, class)| *class)
}

/// Classify a raw statement description. Unknown merchants are Other/General.
pub fn categorize_merchant(description: &str) -> Classification {
    let normalized = normalize(description);
    if normalized.is_empty() {
        return DEFAULT_CLASSIFICATION;
    }

    if normalized.starts_with("paypal") {
        let merchant = strip_paypal(&normalized);
        if merchant.is_empty() {
            return DEFAULT_CLASSIFICATION;
        }
        return paypal_override(merchant)
            .or_else(|| match_rules(merchant))
            .unwrap_or(DEFAULT_CLASSIFICATION);
    }

    match_rules(&normalized).unwrap_or(DEFAULT_CLASSIFICATION)
}
