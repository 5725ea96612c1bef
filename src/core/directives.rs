use crate::constants;
use crate::error::CspError;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::{borrow::Cow, fmt, str::FromStr};

pub const DIRECTIVE_COUNT: usize = 23;

/// Every directive of CSP levels 1 and 2.
///
/// Variants are ordered by wire name, which is also the order they appear in
/// the rendered header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Directive {
    BaseUri,
    BlockAllMixedContent,
    ChildSrc,
    ConnectSrc,
    DefaultSrc,
    DisownOpener,
    FontSrc,
    FormAction,
    FrameAncestors,
    FrameSrc,
    ImgSrc,
    ManifestSrc,
    MediaSrc,
    ObjectSrc,
    PluginTypes,
    ReportTo,
    ReportUri,
    RequireSriFor,
    Sandbox,
    ScriptSrc,
    StyleSrc,
    UpgradeInsecureRequests,
    WorkerSrc,
}

impl Directive {
    pub const ALL: [Directive; DIRECTIVE_COUNT] = [
        Self::BaseUri,
        Self::BlockAllMixedContent,
        Self::ChildSrc,
        Self::ConnectSrc,
        Self::DefaultSrc,
        Self::DisownOpener,
        Self::FontSrc,
        Self::FormAction,
        Self::FrameAncestors,
        Self::FrameSrc,
        Self::ImgSrc,
        Self::ManifestSrc,
        Self::MediaSrc,
        Self::ObjectSrc,
        Self::PluginTypes,
        Self::ReportTo,
        Self::ReportUri,
        Self::RequireSriFor,
        Self::Sandbox,
        Self::ScriptSrc,
        Self::StyleSrc,
        Self::UpgradeInsecureRequests,
        Self::WorkerSrc,
    ];

    /// The canonical wire name, e.g. `default-src`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ChildSrc => constants::CHILD_SRC,
            Self::ConnectSrc => constants::CONNECT_SRC,
            Self::DefaultSrc => constants::DEFAULT_SRC,
            Self::FontSrc => constants::FONT_SRC,
            Self::FrameSrc => constants::FRAME_SRC,
            Self::ImgSrc => constants::IMG_SRC,
            Self::ManifestSrc => constants::MANIFEST_SRC,
            Self::MediaSrc => constants::MEDIA_SRC,
            Self::ObjectSrc => constants::OBJECT_SRC,
            Self::ScriptSrc => constants::SCRIPT_SRC,
            Self::StyleSrc => constants::STYLE_SRC,
            Self::WorkerSrc => constants::WORKER_SRC,
            Self::BaseUri => constants::BASE_URI,
            Self::PluginTypes => constants::PLUGIN_TYPES,
            Self::Sandbox => constants::SANDBOX,
            Self::DisownOpener => constants::DISOWN_OPENER,
            Self::FormAction => constants::FORM_ACTION,
            Self::FrameAncestors => constants::FRAME_ANCESTORS,
            Self::ReportUri => constants::REPORT_URI,
            Self::ReportTo => constants::REPORT_TO,
            Self::BlockAllMixedContent => constants::BLOCK_ALL_MIXED_CONTENT,
            Self::RequireSriFor => constants::REQUIRE_SRI_FOR,
            Self::UpgradeInsecureRequests => constants::UPGRADE_INSECURE_REQUESTS,
        }
    }

    pub const fn kind(self) -> DirectiveKind {
        match self {
            Self::Sandbox | Self::ReportUri | Self::ReportTo | Self::RequireSriFor => {
                DirectiveKind::SingleValue
            }
            Self::DisownOpener | Self::BlockAllMixedContent | Self::UpgradeInsecureRequests => {
                DirectiveKind::Boolean
            }
            _ => DirectiveKind::Set,
        }
    }

    /// Looks a directive up by wire name (`default-src`) or by its
    /// underscore form (`default_src`).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|directive| {
            let canonical = directive.name();
            canonical.len() == name.len()
                && canonical
                    .bytes()
                    .zip(name.bytes())
                    .all(|(c, n)| c == n || (c == b'-' && n == b'_'))
        })
    }

    #[inline]
    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Directive {
    type Err = CspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| CspError::UnknownDirective(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
    Set,
    SingleValue,
    Boolean,
}

impl DirectiveKind {
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Set => "a set of sources",
            Self::SingleValue => "a string",
            Self::Boolean => "a boolean",
        }
    }

    fn zero_value(self) -> DirectiveValue {
        match self {
            Self::Set => DirectiveValue::Set(SourceSet::new()),
            Self::SingleValue => DirectiveValue::Single(String::new()),
            Self::Boolean => DirectiveValue::Flag(false),
        }
    }
}

/// An unordered collection of source expressions.
///
/// Members are rendered sorted, so insertion order never shows up in the
/// header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceSet(FxHashSet<Cow<'static, str>>);

impl SourceSet {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn insert(&mut self, source: impl Into<Cow<'static, str>>) -> bool {
        self.0.insert(source.into())
    }

    #[inline]
    pub fn remove(&mut self, source: &str) -> bool {
        self.0.remove(source)
    }

    #[inline]
    pub fn contains(&self, source: &str) -> bool {
        self.0.contains(source)
    }

    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|source| &**source)
    }

    pub fn sorted(&self) -> SmallVec<[&str; 8]> {
        let mut sources: SmallVec<[&str; 8]> = self.iter().collect();
        sources.sort_unstable();
        sources
    }
}

impl<S> FromIterator<S> for SourceSet
where
    S: Into<Cow<'static, str>>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S> Extend<S> for SourceSet
where
    S: Into<Cow<'static, str>>,
{
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveValue {
    Set(SourceSet),
    Single(String),
    Flag(bool),
}

impl DirectiveValue {
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Self::Set(_) => DirectiveKind::Set,
            Self::Single(_) => DirectiveKind::SingleValue,
            Self::Flag(_) => DirectiveKind::Boolean,
        }
    }

    /// Converts a settings value for `directive`.
    ///
    /// Strings, booleans and arrays of strings map onto the three kinds;
    /// anything else, `null` included, is a type mismatch.
    pub fn from_json(directive: Directive, value: &serde_json::Value) -> Result<Self, CspError> {
        use serde_json::Value;

        let mismatch = |found| CspError::TypeMismatch {
            directive: directive.name(),
            expected: directive.kind().describe(),
            found,
        };

        match value {
            Value::Bool(flag) => Ok(Self::Flag(*flag)),
            Value::String(text) => Ok(Self::Single(text.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(|s| Cow::Owned(s.to_owned()))
                        .ok_or_else(|| mismatch("an array with non-string members"))
                })
                .collect::<Result<SourceSet, _>>()
                .map(Self::Set),
            Value::Null => Err(mismatch("null")),
            Value::Number(_) => Err(mismatch("a number")),
            Value::Object(_) => Err(mismatch("an object")),
        }
    }

    fn is_blank(&self) -> bool {
        match self {
            Self::Set(sources) => sources.is_empty(),
            Self::Single(text) => text.is_empty(),
            Self::Flag(flag) => !flag,
        }
    }
}

impl From<SourceSet> for DirectiveValue {
    fn from(sources: SourceSet) -> Self {
        Self::Set(sources)
    }
}

impl From<String> for DirectiveValue {
    fn from(text: String) -> Self {
        Self::Single(text)
    }
}

impl From<&str> for DirectiveValue {
    fn from(text: &str) -> Self {
        Self::Single(text.to_owned())
    }
}

impl From<bool> for DirectiveValue {
    fn from(flag: bool) -> Self {
        Self::Flag(flag)
    }
}

/// A typed slot for one directive.
///
/// The slot starts out empty. The first read materializes the zero value of
/// the directive's kind, and later reads hand out that same instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveField {
    directive: Directive,
    value: Option<DirectiveValue>,
}

impl DirectiveField {
    #[inline]
    pub fn new(directive: Directive) -> Self {
        Self {
            directive,
            value: None,
        }
    }

    #[inline]
    pub fn directive(&self) -> Directive {
        self.directive
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.directive.name()
    }

    #[inline]
    pub fn kind(&self) -> DirectiveKind {
        self.directive.kind()
    }

    /// The stored value without materializing a default.
    #[inline]
    pub fn value(&self) -> Option<&DirectiveValue> {
        self.value.as_ref()
    }

    /// The stored value, materializing the kind's zero value on first access.
    ///
    /// Use [`set`](Self::set) or the typed getters to change it; the kind of a
    /// field is fixed.
    pub fn get(&mut self) -> &DirectiveValue {
        self.value_or_default()
    }

    fn value_or_default(&mut self) -> &mut DirectiveValue {
        let kind = self.kind();
        self.value.get_or_insert_with(|| kind.zero_value())
    }

    pub fn set(&mut self, value: impl Into<DirectiveValue>) -> Result<(), CspError> {
        let value = value.into();
        self.check_kind(value.kind())?;
        self.value = Some(value);
        Ok(())
    }

    #[inline]
    pub fn clear(&mut self) {
        self.value = None;
    }

    pub fn sources_mut(&mut self) -> Result<&mut SourceSet, CspError> {
        self.check_kind(DirectiveKind::Set)?;
        let directive = self.directive;
        match self.value_or_default() {
            DirectiveValue::Set(sources) => Ok(sources),
            other => Err(Self::mismatch(directive, other.kind())),
        }
    }

    pub fn text_mut(&mut self) -> Result<&mut String, CspError> {
        self.check_kind(DirectiveKind::SingleValue)?;
        let directive = self.directive;
        match self.value_or_default() {
            DirectiveValue::Single(text) => Ok(text),
            other => Err(Self::mismatch(directive, other.kind())),
        }
    }

    pub fn flag_mut(&mut self) -> Result<&mut bool, CspError> {
        self.check_kind(DirectiveKind::Boolean)?;
        let directive = self.directive;
        match self.value_or_default() {
            DirectiveValue::Flag(flag) => Ok(flag),
            other => Err(Self::mismatch(directive, other.kind())),
        }
    }

    /// Whether this field contributes anything to the header.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.value.as_ref().is_some_and(|value| !value.is_blank())
    }

    pub fn render(&self) -> Option<String> {
        let mut out = String::new();
        self.write_to(&mut out).then_some(out)
    }

    /// Appends the header fragment to `out`, returning false when there is
    /// nothing to render.
    pub(crate) fn write_to(&self, out: &mut String) -> bool {
        let Some(value) = self.value.as_ref().filter(|value| !value.is_blank()) else {
            return false;
        };

        out.push_str(self.name());
        match value {
            DirectiveValue::Set(sources) => {
                for source in sources.sorted() {
                    out.push(' ');
                    out.push_str(source);
                }
            }
            DirectiveValue::Single(text) => {
                out.push(' ');
                out.push_str(text);
            }
            DirectiveValue::Flag(_) => {}
        }
        true
    }

    fn check_kind(&self, found: DirectiveKind) -> Result<(), CspError> {
        if found == self.kind() {
            Ok(())
        } else {
            Err(Self::mismatch(self.directive, found))
        }
    }

    fn mismatch(directive: Directive, found: DirectiveKind) -> CspError {
        CspError::TypeMismatch {
            directive: directive.name(),
            expected: directive.kind().describe(),
            found: found.describe(),
        }
    }
}

impl fmt::Display for DirectiveField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_to(&mut out);
        f.write_str(&out)
    }
}
