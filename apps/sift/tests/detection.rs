use sift::catalog::RuleCatalog;
use sift::config::EffectiveConfig;
use sift::engine::Engine;
use sift::models::{AnalysisResult, Category, Severity};

fn run(path: &str, src: &str) -> AnalysisResult {
    let engine = Engine::new(RuleCatalog::builtin().unwrap());
    engine.run(path, src, &EffectiveConfig::default()).unwrap()
}

fn rules_in(r: &AnalysisResult, prefix: &str) -> Vec<String> {
    r.issues
        .iter()
        .filter(|i| i.rule.starts_with(prefix))
        .map(|i| i.rule.clone())
        .collect()
}

#[test]
fn comments_and_strings_never_trigger_code_or_security() {
    let js = "// arr.flatmap() example\nconst message = \"Use arr.push() instead of arr.append()\";\n";
    let r = run("demo.js", js);
    assert!(rules_in(&r, "api/").is_empty(), "{:?}", r.issues);
    assert!(rules_in(&r, "sec/").is_empty(), "{:?}", r.issues);

    let py = "# eval(user_input) is dangerous\nhelp = \"never call os.system('rm -rf /')\"\n";
    let r = run("demo.py", py);
    assert!(rules_in(&r, "sec/").is_empty(), "{:?}", r.issues);
    assert!(rules_in(&r, "api/").is_empty(), "{:?}", r.issues);
}

#[test]
fn hallucinated_os_path_exist() {
    let r = run("app.py", "import os\nif os.path.exist(\"file.txt\"):\n    pass\n");
    let api: Vec<_> = r
        .issues
        .iter()
        .filter(|i| i.rule.starts_with("api/"))
        .collect();
    assert_eq!(api.len(), 1);
    assert_eq!(api[0].rule, "api/py-os-path-exist");
    assert_eq!((api[0].line, api[0].column), (2, 4));
    assert!(api[0].suggestion.as_deref().unwrap().contains("exists"));
}

#[test]
fn javascript_json_spellings_in_python() {
    let r = run(
        "conv.py",
        "import json\ndata = json.parse('{\"key\": \"value\"}')\ntext = json.stringify(data)\n",
    );
    let suggestions: Vec<(&str, &str)> = r
        .issues
        .iter()
        .filter(|i| i.rule.starts_with("api/"))
        .map(|i| (i.rule.as_str(), i.suggestion.as_deref().unwrap_or("")))
        .collect();
    assert_eq!(suggestions.len(), 2);
    assert!(suggestions[0].1.contains("loads"));
    assert!(suggestions[1].1.contains("dumps"));
}

#[test]
fn hardcoded_password_versus_environment_lookup() {
    let r = run("settings.py", "password = \"secret123\"\n");
    let cred: Vec<_> = r
        .issues
        .iter()
        .filter(|i| i.rule == "sec/hardcoded-credential")
        .collect();
    assert_eq!(cred.len(), 1);
    assert!(cred[0].severity >= Severity::Medium);

    let r = run("settings.py", "import os\npassword = os.environ[\"PW\"]\n");
    assert!(rules_in(&r, "sec/hardcoded-credential").is_empty());
}

#[test]
fn shell_commands_are_high_or_critical() {
    for src in [
        "import os\nos.system(\"rm -rf /tmp/dangerous\")\n",
        "import subprocess\nsubprocess.call(\"ls\", shell=True)\n",
    ] {
        let r = run("ops.py", src);
        assert!(
            r.issues
                .iter()
                .any(|i| i.rule.starts_with("sec/") && i.severity >= Severity::High),
            "{src}: {:?}",
            r.issues
        );
    }
    let r = run("ops.py", "import os\nos.system(\"rm -rf /tmp/dangerous\")\n");
    assert_eq!(r.issues[0].rule, "sec/destructive-command");
    assert_eq!(r.issues[0].severity, Severity::Critical);
}

#[test]
fn stock_phrases_in_one_block_give_one_issue() {
    let src = "// As an AI, I wrote this cutting-edge helper.\n// It is state-of-the-art.\nfunction f() {}\n";
    let r = run("f.js", src);
    let ai = rules_in(&r, "ai/");
    assert_eq!(ai, vec!["ai/stock-phrases"]);
    assert_eq!(r.issues[0].severity, Severity::Low);

    let r = run("f.js", "// a cutting-edge helper\nfunction f() {}\n");
    assert!(rules_in(&r, "ai/").is_empty());
}

#[test]
fn every_issue_maps_to_a_catalog_rule() {
    let cat = RuleCatalog::builtin().unwrap();
    let src = "import os, leftpadx\npassword = \"hunter22\"\neval(x)\nos.path.exist(p)\n# As an AI, a cutting-edge tool\n";
    let r = run("mix.py", src);
    assert!(!r.issues.is_empty());
    for i in &r.issues {
        let rule = cat.get(&i.rule).unwrap();
        assert_eq!(rule.severity, i.severity);
        assert!(matches!(
            rule.category,
            Category::HallucinatedApi | Category::Security | Category::AiText
        ));
    }
}
