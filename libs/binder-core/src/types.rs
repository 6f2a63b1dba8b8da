//! Core types for the binder viewer.

use serde::{Deserialize, Serialize};

/// Set code carried by synthetic backface specs.
pub const BACKFACE_SET: &str = "__BACK__";

/// Collector number carried by synthetic backface specs.
pub const BACKFACE_NUMBER: &str = "BACK";

/// Display name of a backface placeholder entry.
pub const BACKFACE_NAME: &str = "Card Back";

/// One requested face slot, as read from a binder file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedSpec {
    pub set_code: String,
    /// Canonical collector-number token used for lookups.
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_name: Option<String>,
    /// Fully specified `Name;Set;Number` line; never sent for resolution.
    pub explicit_entry: bool,
    /// Shown instead of `number`, e.g. `296(361)`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_display_override: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved: Option<CardEntry>,
}

impl ParsedSpec {
    /// Spec that needs catalog resolution.
    pub fn lookup(set_code: &str, number: impl Into<String>, override_name: Option<&str>) -> Self {
        Self {
            set_code: set_code.to_string(),
            number: number.into(),
            override_name: override_name.map(str::to_string),
            explicit_entry: false,
            number_display_override: None,
            resolved: None,
        }
    }

    /// Fully specified spec, pre-resolved from its own fields.
    pub fn explicit(name: &str, set_code: &str, number: &str) -> Self {
        let entry = CardEntry::new(name, number, Some(set_code));
        Self {
            set_code: set_code.to_string(),
            number: number.to_string(),
            override_name: Some(name.to_string()),
            explicit_entry: true,
            number_display_override: None,
            resolved: Some(entry),
        }
    }

    /// Synthetic card-back slot, pre-resolved to a placeholder entry.
    pub fn backface() -> Self {
        Self {
            set_code: BACKFACE_SET.to_string(),
            number: BACKFACE_NUMBER.to_string(),
            override_name: None,
            explicit_entry: false,
            number_display_override: None,
            resolved: Some(CardEntry::backface_placeholder()),
        }
    }

    pub fn is_backface(&self) -> bool {
        self.set_code == BACKFACE_SET && self.number == BACKFACE_NUMBER
    }

    /// Whether this spec produces a fetch request.
    pub fn needs_fetch(&self) -> bool {
        !self.explicit_entry && !self.is_backface()
    }
}

/// Catalog lookup for one spec, joined back by `spec_index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchRequest {
    pub set_code: String,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub override_name: Option<String>,
    pub spec_index: usize,
}

/// Two numbers of one set that must end up side by side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariantPairHint {
    pub set_code: String,
    pub base_number: String,
    pub variant_number: String,
}

impl VariantPairHint {
    pub fn new(set_code: &str, base_number: &str, variant_number: &str) -> Self {
        Self {
            set_code: set_code.to_string(),
            base_number: base_number.to_string(),
            variant_number: variant_number.to_string(),
        }
    }
}

/// A resolved, renderable face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardEntry {
    pub name: String,
    pub number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set: Option<String>,
    pub is_modal_double_faced: bool,
    pub is_back_face: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub front_raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub back_raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_number: Option<String>,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    /// Stamped pairing key, carried through the cache.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pair_key: Option<String>,
    /// Placeholder for a spec the catalog could not resolve.
    #[serde(default)]
    pub unresolved: bool,
}

impl CardEntry {
    pub fn new(name: &str, number: &str, set: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            number: number.to_string(),
            set: set.map(str::to_string),
            is_modal_double_faced: false,
            is_back_face: false,
            front_raw: None,
            back_raw: None,
            display_number: None,
            quantity: 0,
            image_url: None,
            pair_key: None,
            unresolved: false,
        }
    }

    /// Generic card-back face. Lays out as an ordinary single.
    pub fn backface_placeholder() -> Self {
        Self::new(BACKFACE_NAME, BACKFACE_NUMBER, Some(BACKFACE_SET))
    }

    /// Stand-in for a spec that did not resolve.
    pub fn unresolved(spec: &ParsedSpec) -> Self {
        let name = spec
            .override_name
            .clone()
            .unwrap_or_else(|| format!("{} #{}", spec.set_code, spec.number));
        let mut entry = Self::new(&name, &spec.number, Some(&spec.set_code));
        entry.unresolved = true;
        entry
    }

    /// Two-sided front with the given physical face names.
    pub fn two_sided(front: &str, back: &str, number: &str, set: Option<&str>) -> Self {
        let mut entry = Self::new(&format!("{front} // {back}"), number, set);
        entry.is_modal_double_faced = true;
        entry.front_raw = Some(front.to_string());
        entry.back_raw = Some(back.to_string());
        entry
    }

    /// Back face derived from a two-sided front.
    pub fn back_of(front: &CardEntry) -> Self {
        let name = front.back_raw.clone().unwrap_or_else(|| front.name.clone());
        Self {
            name,
            is_back_face: true,
            image_url: None,
            pair_key: None,
            ..front.clone()
        }
    }

    /// Neither two-sided nor a back face.
    pub fn is_ordinary(&self) -> bool {
        !self.is_modal_double_faced && !self.is_back_face
    }

    pub fn is_backface_placeholder(&self) -> bool {
        self.set.as_deref() == Some(BACKFACE_SET) && self.number == BACKFACE_NUMBER
    }

    /// Trimmed, lowercased name used for duplicate detection.
    pub fn name_key(&self) -> String {
        self.name.trim().to_lowercase()
    }

    /// Whether `self` is the back face belonging to `front`.
    pub fn is_back_of(&self, front: &CardEntry) -> bool {
        self.is_back_face
            && front.is_modal_double_faced
            && !front.is_back_face
            && self.set == front.set
            && self.number == front.number
    }
}

/// Grid family offered by the viewer. Tokens are `<columns>x<rows>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutMode {
    #[serde(rename = "2x2")]
    TwoByTwo,
    /// Nine-pocket pages. Faces are never paired in this mode.
    #[serde(rename = "3x3")]
    ThreeByThree,
    #[serde(rename = "4x3")]
    FourByThree,
    #[serde(rename = "4x4")]
    FourByFour,
}

impl Default for LayoutMode {
    fn default() -> Self {
        Self::FourByThree
    }
}

impl LayoutMode {
    /// Get the layout token as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TwoByTwo => "2x2",
            Self::ThreeByThree => "3x3",
            Self::FourByThree => "4x3",
            Self::FourByFour => "4x4",
        }
    }

    /// Parse from a layout token, ignoring case and surrounding whitespace.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "2x2" => Some(Self::TwoByTwo),
            "3x3" => Some(Self::ThreeByThree),
            "4x3" => Some(Self::FourByThree),
            "4x4" => Some(Self::FourByFour),
            _ => None,
        }
    }

    pub fn columns(&self) -> usize {
        match self {
            Self::TwoByTwo => 2,
            Self::ThreeByThree => 3,
            Self::FourByThree | Self::FourByFour => 4,
        }
    }

    pub fn rows(&self) -> usize {
        match self {
            Self::TwoByTwo => 2,
            Self::ThreeByThree | Self::FourByThree => 3,
            Self::FourByFour => 4,
        }
    }

    pub fn slots_per_page(&self) -> usize {
        self.rows() * self.columns()
    }

    /// Whether faces are paired into adjacent columns.
    pub fn pairs_faces(&self) -> bool {
        !matches!(self, Self::ThreeByThree)
    }
}

/// Per-file overrides read from `**` directive lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinderDirectives {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_per_binder: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout_mode: Option<LayoutMode>,
    pub debug: bool,
}

/// Effective settings for one binder load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinderSettings {
    pub layout_mode: LayoutMode,
    pub pages_per_binder: u32,
    pub debug: bool,
    /// Names that are never auto-paired even when exactly two appear in a row.
    pub excluded_pair_names: Vec<String>,
}

impl Default for BinderSettings {
    fn default() -> Self {
        Self {
            layout_mode: LayoutMode::default(),
            pages_per_binder: 20,
            debug: false,
            excluded_pair_names: Vec::new(),
        }
    }
}

impl BinderSettings {
    /// Merge configured defaults with a file's directives. Directives win.
    pub fn merge(defaults: &BinderSettings, directives: &BinderDirectives) -> Self {
        Self {
            layout_mode: directives.layout_mode.unwrap_or(defaults.layout_mode),
            pages_per_binder: directives
                .pages_per_binder
                .unwrap_or(defaults.pages_per_binder),
            debug: defaults.debug || directives.debug,
            excluded_pair_names: defaults.excluded_pair_names.clone(),
        }
    }
}
