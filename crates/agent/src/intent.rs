use std::collections::HashMap;

use pipeshell_core::{CanonicalMethod, ParamBag, ParsedIntent, ShellError};
use tracing::debug;

/// Phrases the model is allowed to emit, plus near-misses it tends to produce.
const DEFAULT_SYNONYMS: [(&str, CanonicalMethod); 7] = [
    ("get activities", CanonicalMethod::ListAll),
    ("get activity", CanonicalMethod::GetById),
    ("get all activities", CanonicalMethod::ListAll),
    ("get activity by id", CanonicalMethod::GetById),
    ("create activity", CanonicalMethod::Create),
    ("update activity", CanonicalMethod::Update),
    ("delete activity", CanonicalMethod::Delete),
];

#[derive(Clone, Debug)]
pub struct SynonymTable {
    entries: HashMap<String, CanonicalMethod>,
}

impl Default for SynonymTable {
    fn default() -> Self {
        let mut table = Self::empty();
        for method in CanonicalMethod::ALL {
            table.insert(method.as_str(), method);
        }
        for (alias, method) in DEFAULT_SYNONYMS {
            table.insert(alias, method);
        }
        table
    }
}

impl SynonymTable {
    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn insert(&mut self, alias: &str, method: CanonicalMethod) {
        self.entries.insert(normalize(alias), method);
    }

    pub fn resolve(&self, name: &str) -> Option<CanonicalMethod> {
        self.entries.get(&normalize(name)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct IntentParser {
    synonyms: SynonymTable,
}

impl IntentParser {
    pub fn new(synonyms: SynonymTable) -> Self {
        Self { synonyms }
    }

    /// Parses `method, token, key=value, ...` into a canonical intent.
    pub fn parse(&self, line: &str) -> Result<ParsedIntent, ShellError> {
        let normalized = line.trim().to_lowercase();
        let mut segments = normalized.split(',').map(str::trim);

        let raw_method = segments.next().unwrap_or_default();
        let method = self
            .synonyms
            .resolve(raw_method)
            .ok_or_else(|| ShellError::UnknownIntent { name: raw_method.to_string() })?;

        let mut params = ParamBag::default();
        for token in segments.filter(|token| !token.is_empty()) {
            match token.split_once('=') {
                Some((key, value)) => params.insert_keyword(key.trim(), value.trim()),
                None => params.push_positional(token),
            }
        }

        debug!(
            event_name = "intent.parsed",
            method = method.as_str(),
            positional_count = params.positional.len(),
            keyword_count = params.keywords.len(),
            "parsed model output into intent"
        );
        Ok(ParsedIntent { method, params })
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use pipeshell_core::{CanonicalMethod, ShellError};

    use super::{IntentParser, SynonymTable};

    #[test]
    fn list_all_without_parameters() {
        let intent = IntentParser::default().parse("get all activities").expect("parses");

        assert_eq!(intent.method, CanonicalMethod::ListAll);
        assert!(intent.params.is_empty());
    }

    #[test]
    fn positional_id_is_preserved() {
        let intent = IntentParser::default().parse("Get Activity By ID, 25").expect("parses");

        assert_eq!(intent.method, CanonicalMethod::GetById);
        assert_eq!(intent.params.positional, vec!["25".to_string()]);
        assert!(intent.params.keywords.is_empty());
    }

    #[test]
    fn keywords_split_once_on_equals() {
        let intent = IntentParser::default()
            .parse("create activity, deal_id = 2, subject=a=b")
            .expect("parses");

        assert_eq!(intent.method, CanonicalMethod::Create);
        assert_eq!(intent.params.keywords.get("deal_id").map(String::as_str), Some("2"));
        assert_eq!(intent.params.keywords.get("subject").map(String::as_str), Some("a=b"));
    }

    #[test]
    fn mixed_tokens_keep_positional_order_and_drop_empty_segments() {
        let intent = IntentParser::default()
            .parse("  update activity, 52, , deal_id=1, 7, deal_id=9 \n")
            .expect("parses");

        assert_eq!(intent.method, CanonicalMethod::Update);
        assert_eq!(intent.params.positional, vec!["52".to_string(), "7".to_string()]);
        assert_eq!(intent.params.keywords.get("deal_id").map(String::as_str), Some("9"));
    }

    #[test]
    fn near_miss_synonyms_resolve() {
        let parser = IntentParser::default();

        assert_eq!(parser.parse("get activities").expect("parses").method, CanonicalMethod::ListAll);
        assert_eq!(parser.parse("get activity, 3").expect("parses").method, CanonicalMethod::GetById);
        assert_eq!(parser.parse("delete activity, 30").expect("parses").method, CanonicalMethod::Delete);
    }

    #[test]
    fn canonical_names_are_fixed_points() {
        let parser = IntentParser::default();
        for method in CanonicalMethod::ALL {
            let once = parser.parse(method.as_str()).expect("canonical name parses");
            let twice = parser.parse(once.method.as_str()).expect("re-parse succeeds");
            assert_eq!(once.method, method);
            assert_eq!(twice.method, method);
        }
    }

    #[test]
    fn unknown_method_is_rejected_with_its_name() {
        let error = IntentParser::default().parse("launch rockets").unwrap_err();
        assert!(matches!(error, ShellError::UnknownIntent { ref name } if name == "launch rockets"));

        let error = IntentParser::default().parse("   ").unwrap_err();
        assert!(matches!(error, ShellError::UnknownIntent { ref name } if name.is_empty()));
    }

    #[test]
    fn table_is_extensible() {
        let mut synonyms = SynonymTable::default();
        let before = synonyms.len();
        synonyms.insert("  Show Activity ", CanonicalMethod::GetById);

        let intent = IntentParser::new(synonyms.clone()).parse("show activity, 8").expect("parses");
        assert_eq!(intent.method, CanonicalMethod::GetById);
        assert_eq!(synonyms.len(), before + 1);
        assert!(SynonymTable::empty().is_empty());
    }
}
