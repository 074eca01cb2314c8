//! Closed catalog of grantable profile paths.
//!
//! Paths are dotted (`user.profile.name.first`) and hierarchical: holding a path
//! grants every path below it. The catalog is compiled in and loaded once into a
//! trie, so descendant checks walk path segments instead of comparing strings.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    Text,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScopeDefinition {
    pub value: &'static str,
    pub label: &'static str,
    pub kind: ScopeKind,
}

/// A scope granted to an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub id: String,
    pub value: String,
}

pub const PROFILE: &str = "user.profile";
pub const NAME: &str = "user.profile.name";
pub const NAME_FIRST: &str = "user.profile.name.first";
pub const NAME_LAST: &str = "user.profile.name.last";
pub const EMAIL: &str = "user.profile.email";
pub const BIRTHDAY: &str = "user.profile.birthday";
pub const PHONE: &str = "user.profile.phone";

const DEFINITIONS: &[ScopeDefinition] = &[
    ScopeDefinition { value: PROFILE, label: "Your full profile", kind: ScopeKind::Text },
    ScopeDefinition { value: NAME, label: "Your full name", kind: ScopeKind::Text },
    ScopeDefinition { value: NAME_FIRST, label: "Your first name", kind: ScopeKind::Text },
    ScopeDefinition { value: NAME_LAST, label: "Your last name", kind: ScopeKind::Text },
    ScopeDefinition { value: EMAIL, label: "Your email address", kind: ScopeKind::Email },
    ScopeDefinition { value: BIRTHDAY, label: "Your birthday", kind: ScopeKind::Text },
    ScopeDefinition { value: PHONE, label: "Your phone number", kind: ScopeKind::Text },
];

#[derive(Debug, Default)]
struct Node {
    definition: Option<&'static ScopeDefinition>,
    children: BTreeMap<&'static str, Node>,
}

#[derive(Debug)]
pub struct ScopeCatalog {
    root: Node,
    definitions: &'static [ScopeDefinition],
}

static CATALOG: Lazy<ScopeCatalog> = Lazy::new(|| ScopeCatalog::build(DEFINITIONS));

impl ScopeCatalog {
    fn build(definitions: &'static [ScopeDefinition]) -> Self {
        let mut root = Node::default();
        for definition in definitions {
            let mut node = &mut root;
            for segment in definition.value.split('.') {
                node = node.children.entry(segment).or_default();
            }
            node.definition = Some(definition);
        }
        Self { root, definitions }
    }

    fn node(&self, path: &str) -> Option<&Node> {
        let mut node = &self.root;
        for segment in path.split('.') {
            node = node.children.get(segment)?;
        }
        Some(node)
    }

    /// Catalog node for `path`, only if the path is itself a grantable entry.
    fn entry(&self, path: &str) -> Option<&Node> {
        self.node(path).filter(|n| n.definition.is_some())
    }
}

pub fn all() -> &'static [ScopeDefinition] {
    CATALOG.definitions
}

pub fn get(value: &str) -> Option<&'static ScopeDefinition> {
    CATALOG.entry(value).and_then(|n| n.definition)
}

pub fn is_known(value: &str) -> bool {
    get(value).is_some()
}

/// Panics on a value outside the catalog; callers only pass catalog paths.
pub fn label_for(value: &str) -> &'static str {
    match get(value) {
        Some(definition) => definition.label,
        None => panic!("unknown scope `{value}`"),
    }
}

/// Panics on a value outside the catalog; callers only pass catalog paths.
pub fn kind_for(value: &str) -> ScopeKind {
    match get(value) {
        Some(definition) => definition.kind,
        None => panic!("unknown scope `{value}`"),
    }
}

/// True iff `target` is the granted path or lies below it in the catalog.
pub fn can_access(granted: &Scope, target: &str) -> bool {
    let Some(granted_node) = CATALOG.entry(&granted.value) else {
        return false;
    };
    let mut node = &CATALOG.root;
    let mut inside = false;
    for segment in target.split('.') {
        match node.children.get(segment) {
            Some(child) => node = child,
            None => return false,
        }
        inside = inside || std::ptr::eq(node, granted_node);
    }
    inside && node.definition.is_some()
}

/// True iff any of the granted scopes reaches `target`.
pub fn covers(granted: &[Scope], target: &str) -> bool {
    granted.iter().any(|scope| can_access(scope, target))
}

/// The scope set a resolved token carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EffectiveScopes {
    /// Full access; carried by user-session tokens.
    Root,
    Granted(Vec<Scope>),
}

impl EffectiveScopes {
    pub fn allows(&self, target: &str) -> bool {
        match self {
            EffectiveScopes::Root => true,
            EffectiveScopes::Granted(scopes) => covers(scopes, target),
        }
    }
}

impl Serialize for EffectiveScopes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EffectiveScopes::Root => serializer.serialize_str("ROOT"),
            EffectiveScopes::Granted(scopes) => {
                serializer.collect_seq(scopes.iter().map(|s| s.value.as_str()))
            }
        }
    }
}
