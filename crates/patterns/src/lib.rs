//! Pattern definitions shared by the loader and the engine, plus the
//! built-in risk catalog.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
/// What a pattern hit means for the flow graph.
pub enum PatternRole {
    /// Untrusted data enters here.
    Source,
    /// Dangerous operation if fed untrusted data.
    Sink,
    /// Data is altered; `safe` transforms act as sanitizers.
    Transform,
    /// Contributes to risk scoring only.
    Generic,
}

impl fmt::Display for PatternRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatternRole::Source => "source",
            PatternRole::Sink => "sink",
            PatternRole::Transform => "transform",
            PatternRole::Generic => "generic",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
/// Declared risk tier of a source pattern.
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Uncompiled description of a risk pattern.
///
/// Used both for the built-in table and for user pattern files:
///
/// ```yaml
/// patterns:
///   - id: custom.template-render
///     regex: '\brender_template_string\s*\('
///     weight: 8
///     category: template-injection
///     message: Template rendered from a string
///     role: sink
/// ```
pub struct PatternDef {
    pub id: String,
    pub regex: String,
    pub weight: u32,
    pub category: String,
    pub message: String,
    pub role: PatternRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<RiskTier>,
    #[serde(default)]
    pub safe: bool,
}

/// File format accepted for extra pattern files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PatternFile {
    #[serde(default)]
    pub patterns: Vec<PatternDef>,
}

struct Builtin {
    id: &'static str,
    regex: &'static str,
    weight: u32,
    category: &'static str,
    message: &'static str,
    role: PatternRole,
    tier: Option<RiskTier>,
    safe: bool,
}

const fn source(
    id: &'static str,
    regex: &'static str,
    weight: u32,
    category: &'static str,
    message: &'static str,
    tier: RiskTier,
) -> Builtin {
    Builtin {
        id,
        regex,
        weight,
        category,
        message,
        role: PatternRole::Source,
        tier: Some(tier),
        safe: false,
    }
}

const fn sink(
    id: &'static str,
    regex: &'static str,
    weight: u32,
    category: &'static str,
    message: &'static str,
) -> Builtin {
    Builtin {
        id,
        regex,
        weight,
        category,
        message,
        role: PatternRole::Sink,
        tier: None,
        safe: false,
    }
}

const fn transform(
    id: &'static str,
    regex: &'static str,
    weight: u32,
    category: &'static str,
    message: &'static str,
    safe: bool,
) -> Builtin {
    Builtin {
        id,
        regex,
        weight,
        category,
        message,
        role: PatternRole::Transform,
        tier: None,
        safe,
    }
}

const fn generic(
    id: &'static str,
    regex: &'static str,
    weight: u32,
    category: &'static str,
    message: &'static str,
) -> Builtin {
    Builtin {
        id,
        regex,
        weight,
        category,
        message,
        role: PatternRole::Generic,
        tier: None,
        safe: false,
    }
}

// Order matters: node ids and same-line node order follow table order.
const BUILTIN: &[Builtin] = &[
    // Sources
    source(
        "source.request-input",
        r"\breq(?:uest)?\.(?:body|query|params|headers|cookies)(?:\.[A-Za-z_$][A-Za-z0-9_$]*)*",
        5,
        "user-input",
        "Untrusted request data",
        RiskTier::High,
    ),
    source(
        "source.form-input",
        r"\brequest\.(?:args|form|json|values|files)\b",
        5,
        "user-input",
        "Untrusted form data",
        RiskTier::High,
    ),
    source(
        "source.location",
        r"\b(?:window\.|document\.)?location\.(?:hash|search|href)\b|\bdocument\.(?:URL|referrer|cookie)\b",
        4,
        "url-input",
        "Value read from the browser location",
        RiskTier::Medium,
    ),
    source(
        "source.storage",
        r"\b(?:localStorage|sessionStorage)\.getItem\s*\(",
        3,
        "storage",
        "Value read from web storage",
        RiskTier::Medium,
    ),
    source(
        "source.stdin",
        r"\binput\s*\(",
        3,
        "user-input",
        "Interactive user input",
        RiskTier::Medium,
    ),
    source(
        "source.environment",
        r"\bprocess\.env(?:\.[A-Za-z_$][A-Za-z0-9_$]*)?|\bos\.environ\b",
        2,
        "environment",
        "Environment variable read",
        RiskTier::Low,
    ),
    source(
        "source.cli-args",
        r"\b(?:process|sys)\.argv\b",
        2,
        "cli-input",
        "Command-line argument read",
        RiskTier::Low,
    ),
    // Sinks
    sink(
        "sink.eval",
        r"\beval\s*\(",
        10,
        "code-execution",
        "Dynamic code evaluation",
    ),
    sink(
        "sink.function-constructor",
        r"\bnew\s+Function\s*\(",
        10,
        "code-execution",
        "Function built from a string",
    ),
    sink(
        "sink.string-timer",
        r#"\bset(?:Timeout|Interval)\s*\(\s*['"`]"#,
        7,
        "code-execution",
        "Timer evaluates a string",
    ),
    sink(
        "sink.command-exec",
        r"\b(?:child_process\.)?exec(?:Sync|File)?\s*\(|\bspawn\s*\(|\bos\.system\s*\(|\bsubprocess\.(?:call|run|Popen)\s*\(",
        9,
        "command-injection",
        "Operating system command execution",
    ),
    sink(
        "sink.sql-interpolation",
        r"\.(?:query|execute|raw)\s*\(\s*`[^`]*\$\{",
        9,
        "sql-injection",
        "SQL built with template interpolation",
    ),
    sink(
        "sink.sql-concat",
        r#"\.(?:query|execute|raw)\s*\(\s*['"][^'"]*['"]\s*\+"#,
        9,
        "sql-injection",
        "SQL built with string concatenation",
    ),
    sink(
        "sink.inner-html",
        r"\.(?:inner|outer)HTML\s*=",
        8,
        "xss",
        "HTML assigned from a dynamic value",
    ),
    sink(
        "sink.document-write",
        r"\bdocument\.write(?:ln)?\s*\(",
        8,
        "xss",
        "document.write with dynamic content",
    ),
    sink(
        "sink.unsafe-deserialize",
        r"\bpickle\.loads?\s*\(|\byaml\.load\s*\(",
        8,
        "deserialization",
        "Unsafe deserialization",
    ),
    sink(
        "sink.fs-access",
        r"\bfs\.(?:readFile|readFileSync|writeFile|writeFileSync|createReadStream|createWriteStream|unlink|unlinkSync)\s*\(",
        6,
        "path-traversal",
        "File system access with a dynamic path",
    ),
    sink(
        "sink.redirect",
        r"\bres\.redirect\s*\(",
        5,
        "open-redirect",
        "Redirect to a dynamic location",
    ),
    // Transforms
    transform(
        "transform.uri-encode",
        r"\bencodeURI(?:Component)?\s*\(",
        1,
        "encoding",
        "URI encoding",
        true,
    ),
    transform(
        "transform.html-escape",
        r"\bhtml\.escape\s*\(|\bescape(?:Html|HTML|_html)?\s*\(",
        1,
        "encoding",
        "HTML escaping",
        true,
    ),
    transform(
        "transform.sanitize",
        r"\b(?:DOMPurify\.)?sanitize[A-Za-z0-9_]*\s*\(|\bvalidator\.escape\s*\(",
        1,
        "sanitization",
        "Explicit sanitizer",
        true,
    ),
    transform(
        "transform.numeric",
        r"\b(?:parseInt|parseFloat|Number)\s*\(",
        1,
        "type-coercion",
        "Numeric coercion",
        true,
    ),
    transform(
        "transform.json-parse",
        r"\bJSON\.parse\s*\(",
        3,
        "deserialization",
        "JSON parsed from a dynamic value",
        false,
    ),
    transform(
        "transform.string-replace",
        r"\.replace(?:All)?\s*\(",
        1,
        "string-manipulation",
        "Ad-hoc string replacement",
        false,
    ),
    // Generic risk
    generic(
        "generic.hardcoded-secret",
        r#"(?i)\b(?:password|passwd|secret|api[_-]?key|access[_-]?token|auth[_-]?token)\b\s*[:=]\s*['"][^'"\s]{4,}['"]"#,
        8,
        "hardcoded-secret",
        "Credential literal in source",
    ),
    generic(
        "generic.react-html",
        r"\bdangerouslySetInnerHTML\b",
        7,
        "xss",
        "React raw HTML injection",
    ),
    generic(
        "generic.tls-disabled",
        r"\brejectUnauthorized\s*:\s*false\b|\bverify\s*=\s*False\b",
        6,
        "insecure-transport",
        "TLS certificate verification disabled",
    ),
    generic(
        "generic.weak-hash",
        r"(?i)\b(?:md5|sha1)\b",
        4,
        "weak-crypto",
        "Weak hash algorithm",
    ),
    generic(
        "generic.cors-wildcard",
        r#"Access-Control-Allow-Origin['"]?\s*[,:]\s*['"]\*"#,
        4,
        "cors",
        "CORS allows any origin",
    ),
    generic(
        "generic.weak-random",
        r"\bMath\.random\s*\(",
        3,
        "weak-random",
        "Non-cryptographic random number",
    ),
    generic(
        "generic.plain-http",
        r#"\bhttp://[^\s'"`]+"#,
        2,
        "insecure-transport",
        "Plain HTTP URL",
    ),
    generic(
        "generic.debug-log",
        r"\bconsole\.(?:log|debug|trace)\s*\(",
        1,
        "information-leak",
        "Debug logging",
    ),
];

/// Definitions of the built-in catalog, in catalog order.
pub fn builtin_defs() -> Vec<PatternDef> {
    BUILTIN
        .iter()
        .map(|b| PatternDef {
            id: b.id.to_string(),
            regex: b.regex.to_string(),
            weight: b.weight,
            category: b.category.to_string(),
            message: b.message.to_string(),
            role: b.role,
            tier: b.tier,
            safe: b.safe,
        })
        .collect()
}
