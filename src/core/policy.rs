use crate::constants::{
    DEFAULT_BUFFER_CAPACITY, DIRECTIVE_SEPARATOR, HEADER_CSP, HEADER_CSP_REPORT_ONLY, NONCE_PREFIX,
};
use crate::core::directives::{
    Directive, DirectiveField, DirectiveValue, SourceSet, DIRECTIVE_COUNT,
};
use crate::error::CspError;
use actix_web::http::header::{HeaderMap, HeaderName, HeaderValue};
use bytes::Bytes;
use std::{borrow::Cow, fmt};

/// The complete set of CSP 1 and 2 directives.
///
/// * Directives which allow for multiple values hold a [`SourceSet`].
/// * Directives which allow for a single value hold a string.
/// * Directives which are boolean in nature are switched on and off.
///
/// ```
/// use actix_content_security::{CspPolicy, Directive, SELF};
///
/// let mut policy = CspPolicy::default();
/// policy.sources(Directive::DefaultSrc)?.insert("http://*.example.com");
/// policy.sources(Directive::DefaultSrc)?.insert(SELF);
/// policy.set(Directive::Sandbox, "allow-scripts")?;
/// policy.set(Directive::BlockAllMixedContent, true)?;
///
/// assert_eq!(
///     policy.text(),
///     "block-all-mixed-content;default-src 'self' http://*.example.com;sandbox allow-scripts"
/// );
/// # Ok::<(), actix_content_security::CspError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspPolicy {
    fields: [DirectiveField; DIRECTIVE_COUNT],
    report_only: bool,
}

impl Default for CspPolicy {
    fn default() -> Self {
        Self::new(false)
    }
}

impl CspPolicy {
    #[inline]
    pub fn new(report_only: bool) -> Self {
        Self {
            fields: Directive::ALL.map(DirectiveField::new),
            report_only,
        }
    }

    /// Builds a policy from `(name, value)` pairs.
    ///
    /// Names may be given in wire form (`default-src`) or underscore form
    /// (`default_src`). Every value goes through [`DirectiveField::set`].
    pub fn from_directives<I, K, V>(report_only: bool, directives: I) -> Result<Self, CspError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<DirectiveValue>,
    {
        let mut policy = Self::new(report_only);
        for (name, value) in directives {
            policy.set_by_name(name.as_ref(), value)?;
        }
        Ok(policy)
    }

    /// Deep copy; the fork shares no set storage with `self`.
    pub fn fork(&self) -> Self {
        Self {
            fields: std::array::from_fn(|index| self.fields[index].clone()),
            report_only: self.report_only,
        }
    }

    #[inline]
    pub fn is_report_only(&self) -> bool {
        self.report_only
    }

    #[inline]
    pub fn field(&self, directive: Directive) -> &DirectiveField {
        &self.fields[directive.index()]
    }

    #[inline]
    pub fn field_mut(&mut self, directive: Directive) -> &mut DirectiveField {
        &mut self.fields[directive.index()]
    }

    /// All fields in rendering order.
    #[inline]
    pub fn fields(&self) -> impl Iterator<Item = &DirectiveField> {
        self.fields.iter()
    }

    /// The source set of a set-valued directive, created empty on first use.
    #[inline]
    pub fn sources(&mut self, directive: Directive) -> Result<&mut SourceSet, CspError> {
        self.field_mut(directive).sources_mut()
    }

    #[inline]
    pub fn set(
        &mut self,
        directive: Directive,
        value: impl Into<DirectiveValue>,
    ) -> Result<(), CspError> {
        self.field_mut(directive).set(value)
    }

    pub fn set_by_name(
        &mut self,
        name: &str,
        value: impl Into<DirectiveValue>,
    ) -> Result<(), CspError> {
        let directive: Directive = name.parse()?;
        self.set(directive, value)
    }

    #[inline]
    pub fn clear(&mut self, directive: Directive) {
        self.field_mut(directive).clear();
    }

    pub fn is_empty(&self) -> bool {
        !self.fields.iter().any(DirectiveField::is_active)
    }

    /// The header value, or an empty string if no directive renders.
    pub fn text(&self) -> String {
        let mut out = String::with_capacity(DEFAULT_BUFFER_CAPACITY);
        for field in &self.fields {
            let mark = out.len();
            if mark > 0 {
                out.push(char::from(DIRECTIVE_SEPARATOR));
            }
            if !field.write_to(&mut out) {
                out.truncate(mark);
            }
        }
        out
    }

    #[inline]
    pub fn header_name(&self) -> HeaderName {
        if self.report_only {
            HeaderName::from_static(HEADER_CSP_REPORT_ONLY)
        } else {
            HeaderName::from_static(HEADER_CSP)
        }
    }

    pub fn header_value(&self) -> Result<Option<HeaderValue>, CspError> {
        let text = self.text();
        if text.is_empty() {
            return Ok(None);
        }

        HeaderValue::from_maybe_shared(Bytes::from(text))
            .map(Some)
            .map_err(|err| CspError::HeaderError(err.to_string()))
    }

    /// Writes the policy into `headers`. Returns whether a header was set;
    /// an empty policy leaves `headers` untouched.
    pub fn apply(&self, headers: &mut HeaderMap) -> Result<bool, CspError> {
        match self.header_value()? {
            Some(value) => {
                headers.insert(self.header_name(), value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn contains_nonce(&self) -> bool {
        self.fields.iter().any(|field| match field.value() {
            Some(DirectiveValue::Set(sources)) => {
                sources.iter().any(|source| source.starts_with(NONCE_PREFIX))
            }
            _ => false,
        })
    }
}

impl fmt::Display for CspPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[derive(Debug, Default)]
pub struct CspPolicyBuilder {
    policy: CspPolicy,
    error: Option<CspError>,
}

impl CspPolicyBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sources<S>(mut self, directive: Directive, sources: impl IntoIterator<Item = S>) -> Self
    where
        S: Into<Cow<'static, str>>,
    {
        let added = self.policy.sources(directive).map(|set| set.extend(sources));
        if let Err(err) = added {
            self.record(err);
        }
        self
    }

    pub fn directive(mut self, name: &str, value: impl Into<DirectiveValue>) -> Self {
        if let Err(err) = self.policy.set_by_name(name, value) {
            self.record(err);
        }
        self
    }

    fn with_value(mut self, directive: Directive, value: DirectiveValue) -> Self {
        if let Err(err) = self.policy.set(directive, value) {
            self.record(err);
        }
        self
    }

    fn record(&mut self, err: CspError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    pub fn child_src<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::ChildSrc, sources)
    }

    pub fn connect_src<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::ConnectSrc, sources)
    }

    pub fn default_src<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::DefaultSrc, sources)
    }

    pub fn font_src<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::FontSrc, sources)
    }

    pub fn frame_src<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::FrameSrc, sources)
    }

    pub fn img_src<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::ImgSrc, sources)
    }

    pub fn manifest_src<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::ManifestSrc, sources)
    }

    pub fn media_src<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::MediaSrc, sources)
    }

    pub fn object_src<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::ObjectSrc, sources)
    }

    pub fn script_src<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::ScriptSrc, sources)
    }

    pub fn style_src<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::StyleSrc, sources)
    }

    pub fn worker_src<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::WorkerSrc, sources)
    }

    pub fn base_uri<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::BaseUri, sources)
    }

    pub fn plugin_types<S: Into<Cow<'static, str>>>(self, types: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::PluginTypes, types)
    }

    pub fn form_action<S: Into<Cow<'static, str>>>(self, sources: impl IntoIterator<Item = S>) -> Self {
        self.add_sources(Directive::FormAction, sources)
    }

    pub fn frame_ancestors<S: Into<Cow<'static, str>>>(
        self,
        sources: impl IntoIterator<Item = S>,
    ) -> Self {
        self.add_sources(Directive::FrameAncestors, sources)
    }

    pub fn sandbox(self, flags: impl Into<String>) -> Self {
        self.with_value(Directive::Sandbox, DirectiveValue::Single(flags.into()))
    }

    pub fn report_uri(self, uri: impl Into<String>) -> Self {
        self.with_value(Directive::ReportUri, DirectiveValue::Single(uri.into()))
    }

    pub fn report_to(self, endpoint: impl Into<String>) -> Self {
        self.with_value(Directive::ReportTo, DirectiveValue::Single(endpoint.into()))
    }

    pub fn require_sri_for(self, kinds: impl Into<String>) -> Self {
        self.with_value(Directive::RequireSriFor, DirectiveValue::Single(kinds.into()))
    }

    pub fn disown_opener(self) -> Self {
        self.with_value(Directive::DisownOpener, DirectiveValue::Flag(true))
    }

    pub fn block_all_mixed_content(self) -> Self {
        self.with_value(Directive::BlockAllMixedContent, DirectiveValue::Flag(true))
    }

    pub fn upgrade_insecure_requests(self) -> Self {
        self.with_value(Directive::UpgradeInsecureRequests, DirectiveValue::Flag(true))
    }

    #[inline]
    pub fn report_only(mut self, enabled: bool) -> Self {
        self.policy.report_only = enabled;
        self
    }

    pub fn build(self) -> Result<CspPolicy, CspError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.policy),
        }
    }

    /// Returns the policy, discarding any directive that failed to apply.
    #[inline]
    pub fn build_unchecked(self) -> CspPolicy {
        self.policy
    }
}
