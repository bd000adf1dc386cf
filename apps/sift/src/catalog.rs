//! Built-in rule catalog.
//!
//! The catalog is an ordinary value: built once at startup, handed to the
//! [`Engine`](crate::engine::Engine), never mutated afterwards. Within a
//! category, rules are listed from most to least specific; analyzers rely
//! on that order when two rules of equal severity land on the same span.

use crate::error::CatalogError;
use crate::language::Language;
use crate::models::rule::{Pattern, Receiver, Rule, Shape, Structural};
use crate::models::{Category, Severity};
use regex::Regex;
use std::collections::HashSet;

const PY: &[Language] = &[Language::Python];
const JS: &[Language] = &[Language::JavaScript, Language::TypeScript];
const RS: &[Language] = &[Language::Rust];
const GO: &[Language] = &[Language::Go];
const JAVA: &[Language] = &[Language::Java];
const ALL: &[Language] = &[];

/// Python standard library and widely used distributions (import names).
pub const KNOWN_PYTHON_MODULES: &[&str] = &[
    "__future__", "abc", "argparse", "array", "ast", "asyncio", "base64", "bisect", "builtins",
    "bz2", "calendar", "cmath", "collections", "concurrent", "configparser", "contextlib",
    "contextvars", "copy", "csv", "ctypes", "dataclasses", "datetime", "decimal", "difflib",
    "dis", "doctest", "email", "enum", "errno", "fnmatch", "fractions", "functools", "gc",
    "getpass", "gettext", "glob", "gzip", "hashlib", "heapq", "hmac", "html", "http",
    "importlib", "inspect", "io", "ipaddress", "itertools", "json", "keyword", "logging",
    "lzma", "marshal", "math", "mimetypes", "multiprocessing", "numbers", "operator", "os",
    "pathlib", "pickle", "platform", "pprint", "queue", "random", "re", "secrets", "select",
    "selectors", "shlex", "shutil", "signal", "socket", "sqlite3", "ssl", "stat",
    "statistics", "string", "struct", "subprocess", "sys", "sysconfig", "tarfile",
    "tempfile", "textwrap", "threading", "time", "timeit", "tkinter", "token", "tokenize",
    "traceback", "types", "typing", "unicodedata", "unittest", "urllib", "uuid", "venv",
    "warnings", "weakref", "xml", "zipfile", "zlib", "zoneinfo",
    "aiohttp", "attr", "attrs", "boto3", "botocore", "bs4", "celery", "click", "cryptography",
    "dateutil", "django", "dotenv", "fastapi", "flask", "httpx", "jinja2", "jwt", "lxml",
    "matplotlib", "numpy", "openai", "pandas", "paramiko", "PIL", "psycopg2", "pydantic",
    "pymongo", "pytest", "redis", "requests", "rich", "scipy", "setuptools", "six",
    "sklearn", "sqlalchemy", "starlette", "sympy", "tensorflow", "toml", "tomli", "torch",
    "tqdm", "typer", "urllib3", "uvicorn", "yaml",
];

/// Node.js built-ins and widely used npm packages.
pub const KNOWN_JS_PACKAGES: &[&str] = &[
    "assert", "async_hooks", "buffer", "child_process", "cluster", "crypto", "dgram", "dns",
    "events", "fs", "fs/promises", "http", "http2", "https", "module", "net", "os", "path",
    "perf_hooks", "process", "querystring", "readline", "stream", "string_decoder", "timers",
    "tls", "tty", "url", "util", "v8", "vm", "worker_threads", "zlib",
    "@angular/core", "@babel/core", "@nestjs/common", "@prisma/client", "@testing-library/react",
    "@types/node", "axios", "bcrypt", "body-parser", "chalk", "classnames", "commander",
    "cors", "date-fns", "dayjs", "debug", "dotenv", "eslint", "express", "fs-extra", "glob",
    "graphql", "helmet", "immer", "jest", "jquery", "jsonwebtoken", "knex", "lodash", "moment",
    "mongoose", "morgan", "next", "node-fetch", "pg", "prettier", "react", "react-dom",
    "react-router", "react-router-dom", "redis", "redux", "rxjs", "semver", "sequelize",
    "socket.io", "styled-components", "svelte", "typeorm", "typescript", "uuid", "vite",
    "vitest", "vue", "webpack", "winston", "ws", "yargs", "zod",
];

/// Command-line tools whose `-c` style argument runs a shell string.
pub const SHELL_PROGRAMS: &[&str] = &[
    "sh", "bash", "zsh", "/bin/sh", "/bin/bash", "/usr/bin/env", "cmd", "cmd.exe",
    "powershell", "pwsh",
];

#[derive(Debug, Clone)]
/// Immutable collection of rules, in declaration order.
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

impl RuleCatalog {
    /// Wrap `rules`, rejecting duplicate ids.
    pub fn new(rules: Vec<Rule>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for r in &rules {
            if !seen.insert(r.id) {
                return Err(CatalogError::Duplicate(r.id.to_string()));
            }
        }
        Ok(RuleCatalog { rules })
    }

    /// The rules shipped with sift.
    pub fn builtin() -> Result<Self, CatalogError> {
        let mut rules = Vec::new();
        rules.extend(api_rules()?);
        rules.extend(security_rules()?);
        rules.extend(ai_text_rules()?);
        RuleCatalog::new(rules)
    }

    /// Rules of `category` that apply to `language`, in catalog order.
    pub fn rules_for(&self, language: Language, category: Category) -> Vec<&Rule> {
        self.rules
            .iter()
            .filter(|r| r.category == category && r.applies_to(language))
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn compile(id: &'static str, pattern: &str) -> Result<Regex, CatalogError> {
    Regex::new(pattern).map_err(|source| CatalogError::Pattern {
        id: id.to_string(),
        source,
    })
}

fn member(
    id: &'static str,
    languages: &'static [Language],
    receiver: Receiver,
    method: &'static str,
    severity: Severity,
    message: &'static str,
    suggestion: &'static str,
) -> Result<Rule, CatalogError> {
    let m = regex::escape(method);
    let source = match receiver {
        Receiver::Exact(path) => format!(r"{}{}\s*\(", regex::escape(path), m),
        Receiver::Any => format!(r"\.{}\s*\(", m),
        Receiver::Inferred(_) => format!(r"\b([A-Za-z_$][\w$]*)\.{}\s*\(", m),
    };
    Ok(Rule {
        id,
        category: Category::HallucinatedApi,
        pattern: Pattern::MemberCall {
            receiver,
            method,
            regex: compile(id, &source)?,
        },
        languages,
        severity,
        message,
        suggestion: Some(suggestion),
    })
}

fn regex_rule(
    id: &'static str,
    category: Category,
    languages: &'static [Language],
    pattern: &str,
    severity: Severity,
    message: &'static str,
    suggestion: Option<&'static str>,
) -> Result<Rule, CatalogError> {
    Ok(Rule {
        id,
        category,
        pattern: Pattern::Regex(compile(id, pattern)?),
        languages,
        severity,
        message,
        suggestion,
    })
}

fn structural(
    id: &'static str,
    category: Category,
    languages: &'static [Language],
    matcher: Structural,
    severity: Severity,
    message: &'static str,
    suggestion: Option<&'static str>,
) -> Rule {
    Rule {
        id,
        category,
        pattern: Pattern::Structural(matcher),
        languages,
        severity,
        message,
        suggestion,
    }
}

fn phrase(id: &'static str, label: &'static str, pattern: &str) -> Result<Rule, CatalogError> {
    regex_rule(
        id,
        Category::AiText,
        ALL,
        &format!("(?i){}", pattern),
        Severity::Low,
        label,
        None,
    )
}

fn payload(
    id: &'static str,
    severity: Severity,
    pattern: &str,
    message: &'static str,
    suggestion: Option<&'static str>,
) -> Result<Rule, CatalogError> {
    Ok(Rule {
        id,
        category: Category::Security,
        pattern: Pattern::Payload(compile(id, pattern)?),
        languages: ALL,
        severity,
        message,
        suggestion,
    })
}

fn marker(
    id: &'static str,
    pattern: &str,
    in_strings: bool,
    message: &'static str,
) -> Result<Rule, CatalogError> {
    Ok(Rule {
        id,
        category: Category::AiText,
        pattern: Pattern::Marker {
            regex: compile(id, pattern)?,
            in_strings,
        },
        languages: ALL,
        severity: Severity::Medium,
        message,
        suggestion: Some("remove instructions aimed at AI agents from source text"),
    })
}

fn api_rules() -> Result<Vec<Rule>, CatalogError> {
    use Receiver::{Any, Exact, Inferred};
    use Severity::{High, Low, Medium};
    let mut rules = vec![
        // Python
        member("api/py-os-path-exist", PY, Exact("os.path."), "exist", High,
            "`os.path.exist` does not exist",
            "use `os.path.exists(...)`")?,
        member("api/py-os-exists", PY, Exact("os."), "exists", High,
            "`os.exists` does not exist; the check lives in `os.path`",
            "use `os.path.exists(...)`")?,
        member("api/py-os-getcwdu", PY, Exact("os."), "getcwdu", Medium,
            "`os.getcwdu` was removed in Python 3",
            "use `os.getcwd()`")?,
        member("api/py-json-parse", PY, Exact("json."), "parse", High,
            "`json.parse` is the JavaScript spelling; Python's json module has no `parse`",
            "use `json.loads(...)`")?,
        member("api/py-json-stringify", PY, Exact("json."), "stringify", High,
            "`json.stringify` is the JavaScript spelling; Python's json module has no `stringify`",
            "use `json.dumps(...)`")?,
        member("api/py-requests-fetch", PY, Exact("requests."), "fetch", High,
            "`requests.fetch` does not exist",
            "use `requests.get(...)`")?,
        member("api/py-time-now", PY, Exact("time."), "now", Medium,
            "`time.now` does not exist",
            "use `time.time()` or `datetime.datetime.now()`")?,
        member("api/py-re-matchall", PY, Exact("re."), "matchAll", Medium,
            "`re.matchAll` does not exist",
            "use `re.finditer(...)`")?,
        member("api/py-re-findAll", PY, Exact("re."), "findAll", Medium,
            "`re.findAll` does not exist",
            "use `re.findall(...)`")?,
        member("api/py-subprocess-exec", PY, Exact("subprocess."), "exec", High,
            "`subprocess.exec` does not exist",
            "use `subprocess.run([...])`")?,
        member("api/py-list-push", PY, Inferred(Shape::Sequence), "push", Medium,
            "`{receiver}` is a list; Python lists have no `push` method",
            "use `{receiver}.append(...)`")?,
        member("api/py-list-length", PY, Inferred(Shape::Sequence), "length", Medium,
            "`{receiver}` is a list; Python lists have no `length` method",
            "use `len({receiver})`")?,
        member("api/py-str-contains", PY, Inferred(Shape::Text), "contains", Medium,
            "`{receiver}` is a str; Python strings have no `contains` method",
            "use the `in` operator: `needle in {receiver}`")?,
        member("api/py-str-to-upper", PY, Inferred(Shape::Text), "toUpperCase", Medium,
            "`{receiver}` is a str; `toUpperCase` is the JavaScript spelling",
            "use `{receiver}.upper()`")?,
        member("api/py-str-to-lower", PY, Inferred(Shape::Text), "toLowerCase", Medium,
            "`{receiver}` is a str; `toLowerCase` is the JavaScript spelling",
            "use `{receiver}.lower()`")?,
        member("api/py-str-trim", PY, Inferred(Shape::Text), "trim", Medium,
            "`{receiver}` is a str; Python strings have no `trim` method",
            "use `{receiver}.strip()`")?,
        member("api/py-dict-has-key", PY, Any, "has_key", Medium,
            "`dict.has_key` was removed in Python 3",
            "use the `in` operator: `key in mapping`")?,
        // JavaScript / TypeScript
        member("api/js-json-loads", JS, Exact("JSON."), "loads", High,
            "`JSON.loads` is the Python spelling; JavaScript's JSON has no `loads`",
            "use `JSON.parse(...)`")?,
        member("api/js-json-dumps", JS, Exact("JSON."), "dumps", High,
            "`JSON.dumps` is the Python spelling; JavaScript's JSON has no `dumps`",
            "use `JSON.stringify(...)`")?,
        member("api/js-console-print", JS, Exact("console."), "print", Medium,
            "`console.print` does not exist",
            "use `console.log(...)`")?,
        member("api/js-array-isarray", JS, Exact("Array."), "isarray", Medium,
            "`Array.isarray` does not exist",
            "use `Array.isArray(...)`")?,
        member("api/js-object-haskey", JS, Exact("Object."), "hasKey", Medium,
            "`Object.hasKey` does not exist",
            "use `Object.hasOwn(obj, key)`")?,
        member("api/js-array-append", JS, Inferred(Shape::Sequence), "append", Medium,
            "`{receiver}` is an array; JavaScript arrays have no `append` method",
            "use `{receiver}.push(...)`")?,
        member("api/js-array-length-call", JS, Inferred(Shape::Sequence), "length", Medium,
            "`length` is a property of `{receiver}`, not a method",
            "use `{receiver}.length`")?,
        member("api/js-str-contains", JS, Inferred(Shape::Text), "contains", Medium,
            "`{receiver}` is a string; JavaScript strings have no `contains` method",
            "use `{receiver}.includes(...)`")?,
        member("api/js-str-strip", JS, Inferred(Shape::Text), "strip", Medium,
            "`{receiver}` is a string; `strip` is the Python spelling",
            "use `{receiver}.trim()`")?,
        member("api/js-flatmap", JS, Any, "flatmap", Medium,
            "`flatmap` does not exist; the method is camel-cased",
            "use `.flatMap(...)`")?,
        member("api/js-get-element-by-id", JS, Any, "getElementByID", Medium,
            "`getElementByID` does not exist",
            "use `.getElementById(...)`")?,
        // Rust
        member("api/rs-fs-read-file", RS, Exact("fs::"), "read_file", High,
            "`std::fs::read_file` does not exist",
            "use `std::fs::read_to_string(...)` or `std::fs::read(...)`")?,
        member("api/rs-push-back", RS, Any, "push_back", Low,
            "`push_back` is not a `Vec` method",
            "use `.push(...)` (or a `VecDeque`)")?,
        member("api/rs-length", RS, Any, "length", Low,
            "std collections and strings expose `len`, not `length`",
            "use `.len()`")?,
        // Go
        member("api/go-strings-contain", GO, Exact("strings."), "Contain", High,
            "`strings.Contain` does not exist",
            "use `strings.Contains(...)`")?,
        member("api/go-fmt-printline", GO, Exact("fmt."), "Printline", High,
            "`fmt.Printline` does not exist",
            "use `fmt.Println(...)`")?,
        member("api/go-errors-newf", GO, Exact("errors."), "Newf", High,
            "`errors.Newf` does not exist in the standard library",
            "use `fmt.Errorf(...)`")?,
        // Java
        member("api/java-printline", JAVA, Exact("System.out."), "printline", High,
            "`System.out.printline` does not exist",
            "use `System.out.println(...)`")?,
        member("api/java-list-push", JAVA, Inferred(Shape::Sequence), "push", Medium,
            "`{receiver}` is a List; Java lists have no `push` method",
            "use `{receiver}.add(...)`")?,
    ];
    rules.push(structural(
        "api/py-unknown-import",
        Category::HallucinatedApi,
        PY,
        Structural::UnknownImport,
        Low,
        "import of unknown module `{name}`",
        Some("check that `{name}` is a real package and is listed in your dependencies"),
    ));
    rules.push(structural(
        "api/js-unknown-import",
        Category::HallucinatedApi,
        JS,
        Structural::UnknownImport,
        Low,
        "import of unknown package `{name}`",
        Some("check that `{name}` exists on the registry and is listed in package.json"),
    ));
    Ok(rules)
}

fn security_rules() -> Result<Vec<Rule>, CatalogError> {
    use Severity::{Critical, High, Medium};
    let cat = Category::Security;
    Ok(vec![
        structural("sec/destructive-command", cat, ALL, Structural::DestructiveCommand, Critical,
            "`{callee}` runs a destructive command: `{command}`",
            Some("avoid recursive deletes and world-writable permissions from program code")),
        structural("sec/command-injection", cat, ALL, Structural::CommandInjection, Critical,
            "`{callee}` runs a shell command built from dynamic input",
            Some("pass an argument list without a shell and validate every argument")),
        structural("sec/shell-true", cat, PY, Structural::ShellTrue, High,
            "`{callee}` invoked with `shell=True`",
            Some("pass the command as a list and drop `shell=True`")),
        structural("sec/command-call", cat, ALL, Structural::CommandCall, High,
            "shell command executed via `{callee}`",
            Some("prefer a library call; if a process is required, use an argument list and no shell")),
        payload("sec/reverse-shell", Critical,
            r"(?i)/dev/(?:tcp|udp)/|\bbash\s+-i\b|\bnc(?:at)?(?:\s+[^\s;|]+)*?\s+-[a-z]*e\s|\bsocat\s+\S*\s*(?:tcp|exec)|/bin/(?:ba)?sh\s+0<&1|\bos\.dup2\s*\(\s*\w+\.fileno\(\)",
            "reverse shell: a shell wired to a network connection",
            Some("remove the payload; remote access belongs in audited tooling"))?,
        payload("sec/cron-injection", Critical,
            r"(?i)\|\s*crontab\b|\bcrontab\s+-\s|/var/spool/cron\b|/etc/cron\.(?:d|hourly|daily|weekly|monthly)/|/etc/crontab\b",
            "writes a cron job for persistence",
            None)?,
        payload("sec/ssh-key-injection", Critical,
            r"(?i)>>\s*\S*authorized_keys\b|\.ssh/authorized_keys\b|\bssh-copy-id\b",
            "modifies `authorized_keys` to grant SSH access",
            None)?,
        structural("sec/secret-file-access", cat, ALL, Structural::SecretFileAccess, High,
            "reads the secret file `{path}`",
            Some("read secrets from a secret manager or an explicitly configured path")),
        regex_rule("sec/env-dump", cat, ALL,
            r"(?m)\bJSON\.stringify\(\s*process\.env\s*\)|\bObject\.(?:keys|entries|values)\(\s*process\.env\s*\)|\bconsole\.log\(\s*process\.env\s*\)|\.\.\.process\.env\b|\bdict\(\s*os\.environ\s*\)|\bos\.environ\.items\(\)|\bfor\s+\w+(?:\s*,\s*\w+)?\s+in\s+os\.environ\b|\bENV\.(?:to_h|each|each_pair)\b|\bos\.Environ\(\)|\bSystem\.getenv\(\s*\)|^\s*(?:printenv|env|export\s+-p)\s*$",
            High,
            "dumps every environment variable, secrets included",
            Some("read the specific variables the program needs"))?,
        structural("sec/socket-backdoor", cat, ALL, Structural::SocketBackdoor, High,
            "raw socket listener bound to every interface via `{callee}`",
            Some("bind to a specific interface such as 127.0.0.1")),
        structural("sec/dns-exfiltration", cat, ALL, Structural::DnsExfiltration, High,
            "DNS lookup of a name built from data: {detail}",
            Some("never encode program data into hostnames")),
        regex_rule("sec/eval", cat, &[Language::Python, Language::JavaScript, Language::TypeScript, Language::Ruby],
            r"\beval\s*\(", High,
            "`eval` executes arbitrary code",
            Some("parse the data explicitly (e.g. `ast.literal_eval`, `JSON.parse`)"))?,
        regex_rule("sec/exec", cat, PY,
            r"\bexec\s*\(", High,
            "`exec` executes arbitrary code",
            None)?,
        regex_rule("sec/new-function", cat, JS,
            r"\bnew\s+Function\s*\(", High,
            "`new Function` compiles code from a string",
            None)?,
        structural("sec/known-secret", cat, ALL, Structural::KnownSecret, Critical,
            "{kind} embedded in source",
            Some("revoke the credential and load it from the environment or a secret manager")),
        structural("sec/hardcoded-credential", cat, ALL, Structural::Credential, High,
            "hardcoded credential assigned to `{name}`",
            Some("read `{name}` from the environment or a secret manager")),
        structural("sec/sql-construction", cat, ALL, Structural::SqlConstruction, High,
            "SQL passed to `{callee}` is built by string construction",
            Some("use parameterized queries with placeholders")),
        structural("sec/yaml-load", cat, PY, Structural::YamlLoad, High,
            "`{callee}` can construct arbitrary Python objects",
            Some("use `yaml.safe_load(...)`")),
        regex_rule("sec/unsafe-deserialize", cat, PY,
            r"\b(?:pickle|cPickle|dill|marshal|shelve)\.(?:loads?|open)\s*\(", High,
            "deserializing untrusted data can execute code",
            Some("use a data-only format such as JSON"))?,
        regex_rule("sec/tls-verify-disabled", cat, ALL,
            r"\bverify\s*=\s*False\b|\brejectUnauthorized\s*:\s*false\b|\bInsecureSkipVerify\s*:\s*true\b|\bdanger_accept_invalid_certs\s*\(\s*true\s*\)",
            High,
            "TLS certificate verification disabled",
            Some("keep certificate verification on; trust a custom CA instead"))?,
        structural("sec/insecure-url", cat, ALL, Structural::InsecureUrl, Medium,
            "insecure `{scheme}` URL",
            Some("use an encrypted transport (`https://`, `sftp://`)")),
    ])
}

fn ai_text_rules() -> Result<Vec<Rule>, CatalogError> {
    let mut rules = vec![structural(
        "ai/stock-phrases",
        Category::AiText,
        ALL,
        Structural::PhraseDensity,
        Severity::Low,
        "comment reads like machine-generated prose ({count} stock phrases: {phrases})",
        Some("rewrite the comment to state what the code does"),
    )];
    let phrases: &[(&'static str, &'static str, &str)] = &[
        ("ai/as-an-ai", "as an AI", r"\bas an ai\b"),
        ("ai/cutting-edge", "cutting-edge", r"\bcutting[- ]edge\b"),
        ("ai/state-of-the-art", "state-of-the-art", r"\bstate[- ]of[- ]the[- ]art\b"),
        ("ai/important-to-note", "it's important to note",
            r"\bit(?:'|’)?s (?:important|crucial|essential) to (?:note|understand|recognize|remember|realize)\b"),
        ("ai/worth-noting", "it's worth noting", r"\bit(?:'|’)?s worth (?:noting|mentioning)\b"),
        ("ai/should-be-noted", "it should be noted", r"\bit (?:should|must) be (?:noted|emphasized)\b"),
        ("ai/leverages-methodologies", "leverages ... methodologies",
            r"\bleverag\w*\b[^.\n]{0,60}?\bmethodolog\w*"),
        ("ai/delves-into", "delves into", r"\bdelv(?:e|es|ing)\s+(?:deep\s+)?into\b"),
        ("ai/nuanced-aspects", "nuanced aspects", r"\bnuanced (?:aspects?|understanding|approach)\b"),
        ("ai/seamless-integration", "seamless integration", r"\bseamless(?:ly)? integrat\w*"),
        ("ai/robust-and-scalable", "robust and scalable", r"\brobust and scalable\b"),
        ("ai/lets-dive-in", "let's dive in", r"\blet(?:'|’)?s dive (?:in|into|deeper)\b"),
        ("ai/in-conclusion", "in conclusion", r"\bin conclusion\b"),
        ("ai/comprehensive", "comprehensive solution", r"\bcomprehensive (?:solution|overview|guide)\b"),
        ("ai/ever-evolving", "ever-evolving landscape", r"\bever[- ]evolving (?:landscape|world|field)\b"),
        ("ai/language-model", "language model self-reference", r"\bi am (?:just )?an? (?:ai|large language model|language model)\b"),
    ];
    for &(id, label, pattern) in phrases {
        rules.push(phrase(id, label, pattern)?);
    }
    rules.push(marker(
        "ai/prompt-ignore-instructions",
        r"(?i)\b(?:ignore|disregard|forget)\s+(?:all\s+)?(?:(?:the|your|any)\s+)?(?:previous|prior|above|earlier|preceding)\s+(?:instructions|prompts?|rules|directions)\b|\bforget\s+everything\b",
        true,
        "prompt injection: text telling an AI agent to ignore its instructions",
    )?);
    rules.push(marker(
        "ai/hidden-system-prompt",
        r"(?im)^[ \t#/*!-]*(?:system(?:\s+prompt)?\s*:\s*you\b|you\s+are\s+(?:now\s+)?(?:an?\s+)?(?:helpful|unrestricted|uncensored)\s+(?:ai|assistant|agent|model)\b|new\s+instructions\s*:)",
        false,
        "prompt injection: system prompt hidden in a comment",
    )?);
    let plain: &[(&'static str, &'static str)] = &[
        ("ai/without-further-ado", "without further ado"),
        ("ai/hope-this-helps", "hope this helps"),
        ("ai/rich-tapestry", "rich tapestry"),
        ("ai/paradigm-shift", "paradigm shift"),
        ("ai/game-changer", "game-changer"),
    ];
    for &(id, text) in plain {
        rules.push(Rule {
            id,
            category: Category::AiText,
            pattern: Pattern::Literal(text),
            languages: ALL,
            severity: Severity::Low,
            message: text,
            suggestion: None,
        });
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_compiles_with_unique_ids() {
        let cat = RuleCatalog::builtin().unwrap();
        assert!(cat.len() > 40);
        let ids: HashSet<_> = cat.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), cat.len());
    }

    #[test]
    fn test_rules_for_filters_language_and_category() {
        let cat = RuleCatalog::builtin().unwrap();
        let py_api = cat.rules_for(Language::Python, Category::HallucinatedApi);
        assert!(py_api.iter().any(|r| r.id == "api/py-os-path-exist"));
        assert!(py_api.iter().all(|r| r.applies_to(Language::Python)));
        assert!(!py_api.iter().any(|r| r.id == "api/js-flatmap"));
        let js_sec = cat.rules_for(Language::JavaScript, Category::Security);
        assert!(js_sec.iter().any(|r| r.id == "sec/new-function"));
        assert!(!js_sec.iter().any(|r| r.id == "sec/shell-true"));
    }

    #[test]
    fn test_ai_text_rules_apply_everywhere() {
        let cat = RuleCatalog::builtin().unwrap();
        let go_ai = cat.rules_for(Language::Go, Category::AiText);
        assert!(go_ai.iter().any(|r| r.id == "ai/stock-phrases"));
        assert!(go_ai.len() > 10);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let cat = RuleCatalog::builtin().unwrap();
        let r = cat.get("sec/eval").unwrap().clone();
        let err = RuleCatalog::new(vec![r.clone(), r]).unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate(id) if id == "sec/eval"));
    }

    #[test]
    fn test_member_regex_shapes() {
        let cat = RuleCatalog::builtin().unwrap();
        let Pattern::MemberCall { regex, .. } = &cat.get("api/py-os-path-exist").unwrap().pattern
        else {
            panic!("expected member call");
        };
        assert!(regex.is_match("os.path.exist (p)"));
        assert!(!regex.is_match("os.path.exists(p)"));
    }
}
