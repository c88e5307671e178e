use crate::config::environment::Environment;
use crate::config::types::Result;
use crate::factory::c::{
    make_c_should_fail, make_c_should_not_warn, make_c_should_warn, make_c_test,
    make_c_test_with_cflags, WARN_CFLAGS,
};
use crate::factory::TestFactory;
use crate::pipeline::Test;

fn is_c_file(name: &str) -> bool {
    name.ends_with(".c") || name.ends_with(".cc")
}

fn should_fail(env: Environment, filename: &str) -> Result<Test> {
    make_c_should_fail(env, filename, "")
}

fn should_warn(env: Environment, filename: &str) -> Result<Test> {
    make_c_should_warn(env, filename, WARN_CFLAGS)
}

fn gnu99_should_warn(env: Environment, filename: &str) -> Result<Test> {
    make_c_should_warn(env, filename, " -Wall -W -std=gnu99")
}

fn gnu99_should_fail(env: Environment, filename: &str) -> Result<Test> {
    make_c_should_fail(env, filename, " -Wall -W -std=gnu99")
}

fn should_warn_pedantic(env: Environment, filename: &str) -> Result<Test> {
    make_c_should_warn(env, filename, " -w -pedantic")
}

fn gnu99(env: Environment, filename: &str) -> Result<Test> {
    make_c_test_with_cflags(env, filename, " -std=gnu99")
}

fn microsoft(env: Environment, filename: &str) -> Result<Test> {
    make_c_test_with_cflags(env, filename, " --ms")
}

fn c99(env: Environment, filename: &str) -> Result<Test> {
    make_c_test_with_cflags(env, filename, " -std=c99")
}

/// Maps a path fragment to the factory for files below it.
#[derive(Debug, Clone, Copy)]
pub struct FactoryRule {
    pub name: &'static str,
    pub fragment: &'static str,
    pub build: TestFactory,
}

const fn rule(name: &'static str, fragment: &'static str, build: TestFactory) -> FactoryRule {
    FactoryRule {
        name,
        fragment,
        build,
    }
}

/// Directory rules, most specific first. The first matching rule wins.
const PATH_RULES: &[FactoryRule] = &[
    rule("should_fail", "C/should_fail/", should_fail),
    rule("should_fail", "C++/should_fail/", should_fail),
    rule("should_warn", "C/should_warn/", should_warn),
    rule("gnu99_should_warn", "C/gnu99/should_warn/", gnu99_should_warn),
    rule("gnu99_should_fail", "C/gnu99/should_fail/", gnu99_should_fail),
    rule("should_warn_pedantic", "C/should_warn_pedantic/", should_warn_pedantic),
    rule("nowarn", "C/nowarn/", make_c_should_not_warn),
    rule("gnu99", "C/gnu99/", gnu99),
    rule("ms", "C/MS/", microsoft),
    rule("c99", "C/", c99),
];

/// Any other C source becomes a plain compile-and-run test.
static WILDCARD_RULE: FactoryRule = rule("c", "", make_c_test);

/// Pick the rule for a target path; `None` means the file is not a test.
pub fn factory_for(path: &str) -> Option<&'static FactoryRule> {
    if !is_c_file(path) {
        return None;
    }
    PATH_RULES
        .iter()
        .find(|rule| path.contains(rule.fragment))
        .or(Some(&WILDCARD_RULE))
}

/// Build the test for a path with a fresh copy of the base environment.
pub fn build_test(base: &Environment, path: &str) -> Option<Result<Test>> {
    factory_for(path).map(|rule| (rule.build)(base.clone(), path))
}
