//! Security analyzer.
//!
//! Everything here is anchored in code: a command call's callee, an
//! assignment's string literal, a regex hit whose bytes are all code, the
//! opening quote of a literal carrying a shell payload. Text in comments
//! and non-code literals is only ever inspected as the value of something
//! code does with it.

use super::{
    find_calls, is_static, keep_highest_per_anchor, list_elements, static_text, Analyzer, Call,
    SourceUnit,
};
use crate::catalog::SHELL_PROGRAMS;
use crate::language::Language;
use crate::lexer::{Literal, LiteralKind};
use crate::models::rule::{Bindings, Pattern, Rule, Structural};
use crate::models::{AnalyzerKind, Issue};
use regex::Regex;
use std::ops::Range;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// How a command API treats its arguments.
enum ShellMode {
    /// The first argument is a shell command line.
    Always,
    /// Argument vector unless `shell=True` is passed.
    Flag,
    /// Shell line when called with a single argument, argv otherwise.
    SingleArg,
    /// Always an argument vector; the program is `args[program]`.
    Argv,
}

struct CommandApi {
    languages: &'static [Language],
    callee: &'static str,
    mode: ShellMode,
    program: usize,
}

const fn api(languages: &'static [Language], callee: &'static str, mode: ShellMode) -> CommandApi {
    CommandApi {
        languages,
        callee,
        mode,
        program: 0,
    }
}

const PY: &[Language] = &[Language::Python];
const JS: &[Language] = &[Language::JavaScript, Language::TypeScript];

const COMMAND_APIS: &[CommandApi] = &[
    api(PY, "os.system", ShellMode::Always),
    api(PY, "os.popen", ShellMode::Always),
    api(PY, "commands.getoutput", ShellMode::Always),
    api(PY, "subprocess.getoutput", ShellMode::Always),
    api(PY, "subprocess.getstatusoutput", ShellMode::Always),
    api(PY, "subprocess.call", ShellMode::Flag),
    api(PY, "subprocess.run", ShellMode::Flag),
    api(PY, "subprocess.Popen", ShellMode::Flag),
    api(PY, "subprocess.check_call", ShellMode::Flag),
    api(PY, "subprocess.check_output", ShellMode::Flag),
    api(PY, "os.execv", ShellMode::Argv),
    api(PY, "os.execvp", ShellMode::Argv),
    api(PY, "os.spawnv", ShellMode::Argv),
    api(JS, "child_process.exec", ShellMode::Always),
    api(JS, "child_process.execSync", ShellMode::Always),
    api(JS, "child_process.spawn", ShellMode::Argv),
    api(JS, "child_process.spawnSync", ShellMode::Argv),
    api(JS, "child_process.execFile", ShellMode::Argv),
    api(JS, "child_process.execFileSync", ShellMode::Argv),
    api(JS, "exec", ShellMode::Always),
    api(JS, "execSync", ShellMode::Always),
    api(JS, "spawn", ShellMode::Argv),
    api(JS, "spawnSync", ShellMode::Argv),
    api(JS, "execFile", ShellMode::Argv),
    api(JS, "execFileSync", ShellMode::Argv),
    api(&[Language::Ruby], "system", ShellMode::SingleArg),
    api(&[Language::Ruby], "exec", ShellMode::SingleArg),
    api(&[Language::Ruby], "spawn", ShellMode::SingleArg),
    api(&[Language::Ruby], "IO.popen", ShellMode::SingleArg),
    api(&[Language::Ruby], "Open3.capture2", ShellMode::SingleArg),
    api(&[Language::Ruby], "Open3.capture3", ShellMode::SingleArg),
    api(&[Language::Ruby], "Open3.popen3", ShellMode::SingleArg),
    api(&[Language::Go], "exec.Command", ShellMode::Argv),
    CommandApi {
        languages: &[Language::Go],
        callee: "exec.CommandContext",
        mode: ShellMode::Argv,
        program: 1,
    },
    api(&[Language::Java], "Runtime.getRuntime().exec", ShellMode::SingleArg),
    api(&[Language::Java], "new ProcessBuilder", ShellMode::Argv),
    api(&[Language::Rust], "Command::new", ShellMode::Argv),
];

const SQL_METHODS: &[&str] = &[
    ".execute",
    ".executemany",
    ".executescript",
    ".executeQuery",
    ".executeUpdate",
    ".prepareStatement",
    ".query",
    ".raw",
    ".Query",
    ".QueryRow",
    ".Exec",
];

const SQL_KEYWORDS: &[&str] = &[
    "select", "insert", "update", "delete", "drop", "create", "alter", "truncate", "replace",
    "merge",
];

const YAML_LOADERS: &[&str] = &["yaml.load", "yaml.load_all", "yaml.unsafe_load"];

/// Name tokens that, alone, mark a credential.
const SECRET_WORDS: &[&str] = &[
    "password", "passwd", "pwd", "secret", "token", "credential", "credentials", "apikey",
    "passphrase", "auth",
];

/// Name tokens that, when last, describe metadata about a credential rather
/// than the credential itself (`password_field`, `token_url`).
const METADATA_SUFFIXES: &[&str] = &[
    "type", "name", "url", "uri", "path", "file", "dir", "header", "field", "prefix", "env",
    "var", "id", "length", "len", "kind", "format", "mode", "label", "endpoint", "regex",
    "pattern", "hint", "policy", "prompt", "placeholder",
];

/// Qualifiers that make `key` a lookup key rather than a secret key.
const KEY_QUALIFIERS: &[&str] = &[
    "primary", "foreign", "sort", "cache", "partition", "lookup", "hash", "row", "unique",
    "index", "dict", "map", "cursor", "public", "group", "object", "storage", "registry", "event",
];

const INSECURE_SCHEMES: &[&str] = &["http://", "ftp://"];

/// Hosts that are never a transport risk or are XML/schema identifiers.
const SAFE_HOSTS: &[&str] = &[
    "localhost", "127.0.0.1", "0.0.0.0", "[::1]", "www.w3.org", "w3.org", "schemas.xmlsoap.org",
    "schemas.microsoft.com", "schemas.openxmlformats.org", "json-schema.org", "purl.org",
    "xmlns.com", "example.com", "example.org", "example.net",
];

/// File-reading calls whose first argument names the file.
const FILE_READERS: &[&str] = &[
    "io.open", "fs.readFileSync", "fs.readFile", "fs.promises.readFile", "fs.createReadStream",
    "readFileSync", "readFile", "fs::read_to_string", "fs::read", "File::open", "os.ReadFile",
    "ioutil.ReadFile", "os.Open", "Files.readAllBytes", "Files.readString", "Files.readAllLines",
    "new FileReader", "new FileInputStream", "File.read", "File.open", "File.readlines",
    "IO.read", "open",
];

/// Path fragments naming credential stores.
const SECRET_PATHS: &[&str] = &[
    "/etc/shadow", "/etc/gshadow", "/etc/sudoers", "/etc/passwd", "id_rsa", "id_dsa",
    "id_ecdsa", "id_ed25519", ".aws/credentials", ".netrc", ".pgpass", ".git-credentials",
    ".docker/config.json", ".kube/config",
];

const SECRET_EXTENSIONS: &[&str] = &[".pem", ".key", ".p12", ".pfx", ".keystore"];

/// Shell programs that print or copy the file they are given.
const READ_COMMANDS: &[&str] = &[
    "cat", "head", "tail", "less", "more", "base64", "xxd", "strings", "cp", "scp",
];

/// Calls that bind or listen on an address.
const LISTENERS: &[&str] = &[
    ".bind", ".listen", "TcpListener::bind", "UdpSocket::bind", "net.Listen",
    "net.ListenPacket", "net.ListenTCP",
];

/// Raw socket servers, as opposed to web framework entry points.
const RAW_SOCKETS: &[&str] = &[
    "socket.socket(", "net.createServer(", "dgram.createSocket(", "TcpListener::bind(",
    "UdpSocket::bind(", "net.Listen(", "net.ListenPacket(", "new ServerSocket(",
    "TCPServer.new(",
];

/// Name resolution calls whose first argument is the host name.
const RESOLVERS: &[&str] = &[
    "socket.gethostbyname", "socket.gethostbyname_ex", "socket.getaddrinfo",
    "dns.resolver.resolve", "dns.resolver.query", "dns.lookup", "dns.resolve",
    "dns.resolve4", "dns.resolveTxt", "dns.promises.lookup", "net.LookupHost", "net.LookupIP",
    "net.LookupTXT", "InetAddress.getByName", "Resolv.getaddress",
];

const LOOKUP_COMMANDS: &[&str] = &["nslookup", "dig", "host"];

#[derive(Debug, Default)]
pub struct SecurityAnalyzer;

impl Analyzer for SecurityAnalyzer {
    fn kind(&self) -> AnalyzerKind {
        AnalyzerKind::Security
    }

    fn analyze(&self, unit: &SourceUnit, rules: &[&Rule]) -> Vec<Issue> {
        let calls = command_calls(unit);
        let mut found = Vec::new();
        for (rank, rule) in rules.iter().enumerate() {
            let hits = match &rule.pattern {
                Pattern::Regex(regex) => unit
                    .code_matches(regex)
                    .map(|m| (m.start(), Bindings::new()))
                    .collect(),
                Pattern::Payload(regex) => payload_hits(unit, regex),
                Pattern::Structural(s) => structural_hits(unit, *s, &calls),
                _ => Vec::new(),
            };
            for (offset, bindings) in hits {
                found.push((rank, rule.issue(unit.location(offset), &bindings)));
            }
        }
        trace!(path = unit.path, issues = found.len(), "security analyzer done");
        keep_highest_per_anchor(found)
    }
}

fn structural_hits(
    unit: &SourceUnit,
    matcher: Structural,
    calls: &[CommandCall],
) -> Vec<(usize, Bindings)> {
    match matcher {
        Structural::CommandCall => calls.iter().map(|c| (c.call.start, c.bindings())).collect(),
        Structural::ShellTrue => calls
            .iter()
            .filter(|c| c.api.mode == ShellMode::Flag && c.shell_flag)
            .map(|c| (c.call.start, c.bindings()))
            .collect(),
        Structural::CommandInjection => calls
            .iter()
            .filter(|c| c.injectable(unit))
            .map(|c| (c.call.start, c.bindings()))
            .collect(),
        Structural::DestructiveCommand => calls
            .iter()
            .filter_map(|c| {
                let line = c.command_line(unit);
                is_destructive(&line).then(|| {
                    let shown: String = line.chars().take(60).collect();
                    (c.call.start, c.bindings().with("command", shown))
                })
            })
            .collect(),
        Structural::YamlLoad => yaml_loads(unit),
        Structural::KnownSecret => unit
            .value_literals()
            .filter_map(|l| known_secret(l.text(unit.text)).map(|kind| (l.start, kind)))
            .map(|(at, kind)| (at, Bindings::new().with("kind", kind)))
            .collect(),
        Structural::Credential => credentials(unit),
        Structural::InsecureUrl => unit
            .value_literals()
            .filter_map(|l| insecure_scheme(l.text(unit.text)).map(|s| (l.start, s)))
            .map(|(at, scheme)| (at, Bindings::new().with("scheme", scheme)))
            .collect(),
        Structural::SqlConstruction => sql_constructions(unit),
        Structural::SecretFileAccess => secret_file_reads(unit, calls),
        Structural::SocketBackdoor => socket_backdoors(unit),
        Structural::DnsExfiltration => dns_exfiltration(unit),
        _ => Vec::new(),
    }
}

struct CommandCall {
    api: &'static CommandApi,
    call: Call,
    shell_flag: bool,
}

impl CommandCall {
    fn bindings(&self) -> Bindings {
        Bindings::new().with("callee", self.api.callee)
    }

    fn runs_shell_line(&self) -> bool {
        match self.api.mode {
            ShellMode::Always => true,
            ShellMode::Flag => self.shell_flag,
            ShellMode::SingleArg => self.call.args.len() == 1,
            ShellMode::Argv => false,
        }
    }

    /// Positional arguments with list literals flattened, shell flag
    /// keyword arguments dropped.
    fn argv(&self, unit: &SourceUnit) -> Vec<Range<usize>> {
        let mut out = Vec::new();
        for arg in &self.call.args {
            if is_keyword_arg(unit, arg.clone()) {
                continue;
            }
            match list_elements(unit, arg.clone()) {
                Some(items) => out.extend(items),
                None => out.push(arg.clone()),
            }
        }
        out
    }

    fn injectable(&self, unit: &SourceUnit) -> bool {
        if self.runs_shell_line() {
            return self
                .call
                .args
                .get(self.api.program)
                .is_some_and(|a| !is_static(unit, a.clone()));
        }
        let argv = self.argv(unit);
        let Some(program) = argv.get(self.api.program) else {
            return false;
        };
        if !is_static(unit, program.clone()) {
            return false;
        }
        let name = static_text(unit, program.clone());
        SHELL_PROGRAMS.contains(&name.as_str())
            && argv[self.api.program + 1..]
                .iter()
                .any(|a| !is_static(unit, a.clone()))
    }

    /// The command line the call would run, from its literal arguments.
    fn command_line(&self, unit: &SourceUnit) -> String {
        let parts: Vec<String> = self
            .argv(unit)
            .into_iter()
            .map(|a| {
                unit.literals_in(a)
                    .map(|l| l.text(unit.text))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .filter(|s| !s.is_empty())
            .collect();
        parts.join(" ")
    }
}

fn command_calls(unit: &SourceUnit) -> Vec<CommandCall> {
    let lang = unit.language();
    let mut out: Vec<CommandCall> = Vec::new();
    for api in COMMAND_APIS.iter().filter(|a| a.languages.contains(&lang)) {
        for call in find_calls(unit, api.callee) {
            // `child_process.exec` also contains a bare `exec` call site.
            if out.iter().any(|c| c.call.open == call.open) {
                continue;
            }
            let shell_flag = call.args.iter().any(|a| {
                let text = unit.slice(a.clone());
                let compact: String = text.split_whitespace().collect();
                compact == "shell=True" && unit.is_code_range(a.clone())
            });
            out.push(CommandCall {
                api,
                call,
                shell_flag,
            });
        }
    }
    out.sort_by_key(|c| c.call.start);
    out
}

fn is_keyword_arg(unit: &SourceUnit, arg: Range<usize>) -> bool {
    let text = unit.slice(arg);
    match text.find('=') {
        Some(i) => {
            let name = text[..i].trim();
            !name.is_empty()
                && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
                && !text[i + 1..].starts_with('=')
        }
        None => false,
    }
}

/// `rm -rf`, `chmod 777`, `mkfs`, `dd if=` and the classic fork bomb.
fn is_destructive(command: &str) -> bool {
    if command.contains(":(){") || command.contains(":() {") {
        return true;
    }
    let words: Vec<&str> = command.split_whitespace().collect();
    for (i, w) in words.iter().enumerate() {
        let prog = w.rsplit('/').next().unwrap_or(w);
        let flags: String = words[i + 1..]
            .iter()
            .take_while(|f| f.starts_with('-'))
            .map(|f| {
                if *f == "--recursive" {
                    "r"
                } else if *f == "--force" {
                    "f"
                } else {
                    f.trim_start_matches('-')
                }
            })
            .collect::<Vec<_>>()
            .concat();
        match prog {
            "rm" if flags.contains(['r', 'R']) && flags.contains('f') => return true,
            "chmod" => {
                let mode = words[i + 1..].iter().find(|f| !f.starts_with('-'));
                if mode.is_some_and(|m| *m == "777" || *m == "0777" || *m == "a+rwx") {
                    return true;
                }
            }
            "dd" if words[i + 1..].iter().any(|a| a.starts_with("if=")) => return true,
            p if p == "mkfs" || p.starts_with("mkfs.") => return true,
            _ => {}
        }
    }
    false
}

fn yaml_loads(unit: &SourceUnit) -> Vec<(usize, Bindings)> {
    let mut out = Vec::new();
    for callee in YAML_LOADERS {
        for call in find_calls(unit, callee) {
            let safe_loader = call.args.iter().skip(1).any(|a| {
                let t = unit.slice(a.clone());
                t.contains("SafeLoader") || t.contains("BaseLoader")
            });
            if *callee == "yaml.unsafe_load" || !safe_loader {
                out.push((call.start, Bindings::new().with("callee", *callee)));
            }
        }
    }
    out
}

/// Human name of a well-known secret format found in `text`.
fn known_secret(text: &str) -> Option<&'static str> {
    const FORMATS: &[(&str, &str, usize)] = &[
        ("AKIA", "AWS access key id", 16),
        ("ASIA", "AWS temporary access key id", 16),
        ("ghp_", "GitHub personal access token", 36),
        ("gho_", "GitHub OAuth token", 36),
        ("ghu_", "GitHub user token", 36),
        ("ghs_", "GitHub server token", 36),
        ("ghr_", "GitHub refresh token", 36),
        ("github_pat_", "GitHub fine-grained token", 40),
        ("glpat-", "GitLab personal access token", 20),
        ("xoxb-", "Slack bot token", 10),
        ("xoxp-", "Slack user token", 10),
        ("xoxa-", "Slack app token", 10),
        ("xoxr-", "Slack refresh token", 10),
        ("xoxs-", "Slack session token", 10),
        ("sk_live_", "Stripe live secret key", 16),
        ("rk_live_", "Stripe live restricted key", 16),
        ("AIza", "Google API key", 35),
        ("sk-ant-", "Anthropic API key", 32),
    ];
    if text.contains("-----BEGIN") && text.contains("PRIVATE KEY") {
        return Some("private key");
    }
    for &(prefix, kind, min) in FORMATS {
        for (i, _) in text.match_indices(prefix) {
            let before_ok = text[..i]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_ascii_alphanumeric());
            let body = text[i + prefix.len()..]
                .chars()
                .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .count();
            if before_ok && body >= min {
                return Some(kind);
            }
        }
    }
    None
}

fn insecure_scheme(text: &str) -> Option<&'static str> {
    let t = text.trim_start();
    let scheme = INSECURE_SCHEMES
        .iter()
        .copied()
        .find(|s| t.get(..s.len()).is_some_and(|p| p.eq_ignore_ascii_case(s)))?;
    let rest = &t[scheme.len()..];
    let host_port = rest.split(['/', '?', '#']).next().unwrap_or("");
    let host = host_port
        .rsplit('@')
        .next()
        .unwrap_or(host_port)
        .to_ascii_lowercase();
    let host = match host.strip_prefix('[') {
        Some(v6) => format!("[{}]", v6.split(']').next().unwrap_or("")),
        None => host.split(':').next().unwrap_or("").to_string(),
    };
    if host.is_empty() || host.starts_with("127.") || SAFE_HOSTS.contains(&host.as_str()) {
        return None;
    }
    Some(scheme)
}

fn credentials(unit: &SourceUnit) -> Vec<(usize, Bindings)> {
    let mut out = Vec::new();
    for lit in unit.value_literals() {
        if lit.kind == LiteralKind::Char || lit.interpolated || !lit.terminated {
            continue;
        }
        let value = lit.text(unit.text);
        if value.trim().is_empty() || is_placeholder(value) {
            continue;
        }
        if !ends_expression(unit, lit) {
            continue;
        }
        let line_start = unit.text[..lit.start].rfind('\n').map_or(0, |i| i + 1);
        let before = strip_literal_prefix(&unit.text[line_start..lit.start]);
        let Some(name) = target_name(before) else {
            continue;
        };
        if is_credential_name(&name) {
            out.push((lit.start, Bindings::new().with("name", name)));
        }
    }
    out
}

/// Drop string prefix letters glued to the quote (`b"..."`, `r'...'`).
fn strip_literal_prefix(before: &str) -> &str {
    let trimmed = before.trim_end_matches(|c: char| c.is_ascii_alphabetic());
    if before.len() - trimmed.len() <= 2 && trimmed.ends_with([' ', '\t', '=', ':', '(', ',']) {
        trimmed
    } else {
        before
    }
}

/// Whether the literal is the whole value: followed only by a separator,
/// a comment, or end of line.
fn ends_expression(unit: &SourceUnit, lit: &Literal) -> bool {
    let rest = unit.text.get(lit.end..).unwrap_or("");
    let rest = rest.trim_start_matches([' ', '\t']);
    match rest.chars().next() {
        None | Some('\n' | '\r' | ',' | ';' | ')' | '}' | ']') => true,
        Some(_) => {
            let at = unit.text.len() - rest.len();
            unit.map.classify(at).is_comment()
        }
    }
}

fn is_placeholder(value: &str) -> bool {
    let v = value.trim();
    (v.starts_with("${") && v.ends_with('}'))
        || (v.starts_with("{{") && v.ends_with("}}"))
        || (v.starts_with('<') && v.ends_with('>'))
        || v.chars().all(|c| c == '*' || c == 'x' || c == 'X' || c == '.')
        || v.starts_with('%')
}

/// Name the literal is bound to by the code immediately before it:
/// `name = `, `name: T = `, `name := `, `"name": `, `name: `,
/// `cfg["name"] = `, `f(name=`.
fn target_name(before: &str) -> Option<String> {
    let b = before.trim_end();
    if let Some(head) = b.strip_suffix(":=") {
        return trailing_ident(head);
    }
    if let Some(head) = b.strip_suffix('=') {
        if head.ends_with(['=', '!', '<', '>', '+', '-', '*', '/', '%', '|', '&', '^']) {
            return None;
        }
        let head = head.trim_end();
        // Subscript target: cfg["password"] =
        if let Some(inner) = head.strip_suffix(']') {
            let inner = inner.trim_end();
            let quoted = inner.strip_suffix(['"', '\''])?;
            let start = quoted.rfind(['"', '\''])?;
            return Some(quoted[start + 1..].to_string());
        }
        // Typed declaration: name: Type = / Type name =
        let head = match head.rfind(':') {
            Some(i) if !head[..i].ends_with(':') => {
                let (name, ty) = head.split_at(i);
                if ty.contains('(') {
                    head
                } else {
                    name
                }
            }
            _ => head,
        };
        return trailing_ident(head);
    }
    if let Some(head) = b.strip_suffix(':') {
        if head.ends_with(':') {
            return None;
        }
        let head = head.trim_end();
        if let Some(q) = head.strip_suffix(['"', '\'']) {
            let start = q.rfind(['"', '\''])?;
            return Some(q[start + 1..].to_string());
        }
        return trailing_ident(head);
    }
    None
}

fn trailing_ident(head: &str) -> Option<String> {
    let head = head.trim_end();
    let start = head
        .rfind(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$' || c == '-' || c == '.'))
        .map_or(0, |i| i + 1);
    let name = head[start..].trim_start_matches('.');
    (!name.is_empty()).then(|| name.to_string())
}

/// Split `userAPIKey`, `db_password`, `X-Auth-Token` into lowercase words.
fn name_tokens(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut cur = String::new();
    let chars: Vec<char> = name.chars().collect();
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !cur.is_empty() {
                tokens.push(std::mem::take(&mut cur));
            }
            continue;
        }
        let boundary = c.is_uppercase()
            && !cur.is_empty()
            && (chars[i - 1].is_lowercase()
                || chars.get(i + 1).is_some_and(|n| n.is_lowercase()));
        if boundary {
            tokens.push(std::mem::take(&mut cur));
        }
        cur.push(c);
    }
    if !cur.is_empty() {
        tokens.push(cur);
    }
    tokens.into_iter().map(|t| t.to_lowercase()).collect()
}

fn is_credential_name(name: &str) -> bool {
    let tokens = name_tokens(name);
    let Some(last) = tokens.last() else {
        return false;
    };
    if tokens.len() > 1 && METADATA_SUFFIXES.contains(&last.as_str()) {
        return false;
    }
    if tokens.iter().any(|t| SECRET_WORDS.contains(&t.as_str())) {
        return true;
    }
    tokens.iter().any(|t| t == "key")
        && !tokens.iter().any(|t| KEY_QUALIFIERS.contains(&t.as_str()))
}

/// Hits of a payload regex in code, plus string literals in code whose
/// text matches, anchored at the opening quote.
fn payload_hits(unit: &SourceUnit, regex: &Regex) -> Vec<(usize, Bindings)> {
    let mut hits: Vec<usize> = unit.code_matches(regex).map(|m| m.start()).collect();
    hits.extend(
        unit.value_literals()
            .filter(|l| regex.is_match(l.text(unit.text)))
            .map(|l| l.start),
    );
    hits.sort_unstable();
    hits.dedup();
    hits.into_iter().map(|at| (at, Bindings::new())).collect()
}

/// Code lines of a shell script: offset of the first word and the text up
/// to any trailing comment.
fn shell_lines<'a>(unit: &SourceUnit<'a>) -> Vec<(usize, &'a str)> {
    let mut out = Vec::new();
    let mut start = 0;
    for raw in unit.text.split_inclusive('\n') {
        let line_start = start;
        start += raw.len();
        let indent = raw.len() - raw.trim_start().len();
        let at = line_start + indent;
        if at >= start || !unit.map.is_code(at) {
            continue;
        }
        let end = (at..start)
            .find(|&o| unit.map.classify(o).is_comment())
            .unwrap_or(start);
        out.push((at, unit.slice(at..end).trim_end()));
    }
    out
}

fn secret_file_reads(unit: &SourceUnit, calls: &[CommandCall]) -> Vec<(usize, Bindings)> {
    let mut out = Vec::new();
    let mut seen = Vec::new();
    for reader in FILE_READERS {
        for call in find_calls(unit, reader) {
            // `File::open` also contains a bare `open` call site.
            if seen.contains(&call.open) {
                continue;
            }
            seen.push(call.open);
            let Some(first) = call.args.first() else {
                continue;
            };
            let path = unit
                .literals_in(first.clone())
                .find_map(|l| secret_path(l.text(unit.text)));
            if let Some(path) = path {
                out.push((call.start, Bindings::new().with("path", path)));
            }
        }
    }
    for c in calls {
        if let Some(path) = shell_secret_read(&c.command_line(unit)) {
            out.push((c.call.start, Bindings::new().with("path", path)));
        }
    }
    if unit.language() == Language::Shell {
        for (at, line) in shell_lines(unit) {
            if let Some(path) = shell_secret_read(line) {
                out.push((at, Bindings::new().with("path", path)));
            }
        }
    }
    out
}

fn secret_path(text: &str) -> Option<&str> {
    let t = text.trim().trim_matches(['"', '\'']);
    let name = t.rsplit(['/', '\\']).next().unwrap_or(t);
    let hit = SECRET_PATHS.iter().any(|p| t.contains(p))
        || SECRET_EXTENSIONS
            .iter()
            .any(|e| name.len() > e.len() && name.ends_with(e))
        || name == ".env";
    hit.then_some(t)
}

/// `cat ~/.aws/credentials` and the like: a read command, then a secret
/// path among its words.
fn shell_secret_read(line: &str) -> Option<String> {
    let mut reading = false;
    for word in line.split(|c: char| c.is_whitespace() || matches!(c, ';' | '|' | '&' | '(' | ')' | '`')) {
        if word.is_empty() {
            continue;
        }
        let program = word.rsplit('/').next().unwrap_or(word);
        if READ_COMMANDS.contains(&program) {
            reading = true;
            continue;
        }
        if reading {
            if let Some(path) = secret_path(word) {
                return Some(path.to_string());
            }
        }
    }
    None
}

fn socket_backdoors(unit: &SourceUnit) -> Vec<(usize, Bindings)> {
    let raw = RAW_SOCKETS
        .iter()
        .any(|m| unit.text.match_indices(m).any(|(i, _)| unit.map.is_code(i)));
    if !raw {
        return Vec::new();
    }
    let mut out = Vec::new();
    for listener in LISTENERS {
        for call in find_calls(unit, listener) {
            let wildcard = unit
                .literals_in(call.open..call.close)
                .any(|l| is_wildcard_address(l.text(unit.text)));
            if !wildcard {
                continue;
            }
            let at = if listener.starts_with('.') {
                call.start + 1
            } else {
                call.start
            };
            out.push((at, Bindings::new().with("callee", listener.trim_start_matches('.'))));
        }
    }
    out
}

/// `0.0.0.0`, `::`, `:4444` (Go), or Python's empty host.
fn is_wildcard_address(text: &str) -> bool {
    let t = text.trim();
    let port_only = t.len() > 1 && t.starts_with(':') && t[1..].bytes().all(|b| b.is_ascii_digit());
    matches!(t, "" | "0.0.0.0" | "::" | "[::]" | "*")
        || t.starts_with("0.0.0.0:")
        || t.starts_with("[::]:")
        || port_only
}

fn dns_exfiltration(unit: &SourceUnit) -> Vec<(usize, Bindings)> {
    let mut out = Vec::new();
    for resolver in RESOLVERS {
        for call in find_calls(unit, resolver) {
            let Some(host) = call.args.first() else {
                continue;
            };
            if is_static(unit, host.clone()) {
                continue;
            }
            let domain = unit
                .literals_in(host.clone())
                .find_map(|l| appended_domain(l.text(unit.text)));
            if let Some(domain) = domain {
                let detail = format!("`{}` under `{}`", resolver, domain);
                out.push((call.start, Bindings::new().with("detail", detail)));
            }
        }
    }
    for lit in unit.value_literals() {
        if let Some(detail) = encoded_lookup(lit.text(unit.text)) {
            out.push((lit.start, Bindings::new().with("detail", detail)));
        }
    }
    if unit.language() == Language::Shell {
        for (at, line) in shell_lines(unit) {
            if let Some(detail) = encoded_lookup(line) {
                out.push((at, Bindings::new().with("detail", detail)));
            }
        }
    }
    out
}

/// The fixed parent domain data is prepended to: `.evil.com` in
/// `data + ".evil.com"` or `f"{data}.evil.com"`.
fn appended_domain(text: &str) -> Option<&str> {
    let tail = text.rsplit('}').next().unwrap_or(text).trim();
    let name = tail.strip_prefix('.')?;
    let labels: Vec<&str> = name.split('.').collect();
    let valid = labels.len() >= 2
        && labels
            .iter()
            .all(|l| !l.is_empty() && l.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-'))
        && labels
            .last()
            .is_some_and(|tld| tld.bytes().all(|b| b.is_ascii_alphabetic()));
    valid.then_some(tail)
}

/// A host name led by a long encoded label, or a lookup command whose
/// name is built from shell variables or such a label.
fn encoded_lookup(text: &str) -> Option<String> {
    let words: Vec<&str> = text
        .split(|c: char| c.is_whitespace() || matches!(c, ';' | '|' | '(' | ')' | '`' | '"' | '\''))
        .filter(|w| !w.is_empty())
        .collect();
    for (i, word) in words.iter().enumerate() {
        let program = word.rsplit('/').next().unwrap_or(word);
        if LOOKUP_COMMANDS.contains(&program) {
            let name = words[i + 1..]
                .iter()
                .find(|w| !w.starts_with('-') && !w.starts_with('@'));
            if let Some(name) = name {
                let dynamic = name.contains('$') && name.contains('.');
                if dynamic || encoded_label(name) >= 20 {
                    return Some(format!("`{} {}`", program, name));
                }
            }
        }
        for host in word.split(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '-')) {
            let labels = host.split('.').count();
            if labels >= 3 && encoded_label(host) >= 32 && host.rsplit('.').next().is_some_and(is_tld) {
                return Some(format!("`{}`", host));
            }
        }
    }
    None
}

/// Length of the first label when it is entirely alphanumeric.
fn encoded_label(host: &str) -> usize {
    let label = host.split('.').next().unwrap_or("");
    if label.bytes().all(|b| b.is_ascii_alphanumeric()) {
        label.len()
    } else {
        0
    }
}

fn is_tld(label: &str) -> bool {
    label.len() >= 2 && label.bytes().all(|b| b.is_ascii_alphabetic())
}

fn sql_constructions(unit: &SourceUnit) -> Vec<(usize, Bindings)> {
    let mut out = Vec::new();
    for method in SQL_METHODS {
        for call in find_calls(unit, method) {
            let Some(first) = call.args.first() else {
                continue;
            };
            if builds_sql(unit, first.clone()) {
                let name = &method[1..];
                out.push((call.start + 1, Bindings::new().with("callee", name)));
            }
        }
    }
    out
}

/// A SQL keyword literal combined with dynamic data in one expression.
fn builds_sql(unit: &SourceUnit, arg: Range<usize>) -> bool {
    let literals: Vec<&Literal> = unit.literals_in(arg.clone()).collect();
    let has_sql = literals.iter().any(|l| {
        let lower = l.text(unit.text).to_ascii_lowercase();
        lower
            .split(|c: char| !c.is_ascii_alphabetic())
            .any(|w| SQL_KEYWORDS.contains(&w))
    });
    if !has_sql {
        return false;
    }
    if literals.iter().any(|l| l.interpolated) {
        return true;
    }
    let mut code = String::new();
    let mut i = arg.start;
    for l in &literals {
        if l.start >= i {
            code.push_str(unit.slice(i..l.start));
            code.push(' ');
            i = l.end;
        }
    }
    code.push_str(unit.slice(i.min(arg.end)..arg.end));
    code.contains('+')
        || code.contains('%')
        || code.contains(".format(")
        || code.contains("Sprintf(")
        || code.contains("String.format(")
        || code.contains("format!(")
        || code.contains(".concat(")
}
