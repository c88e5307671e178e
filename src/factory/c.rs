//! Test pipelines for C sources

use crate::checks::{
    check_memcheck_output, check_no_errors, check_no_warnings, check_retcode_zero,
    create_check_errors_reference, create_check_reference_output,
    create_check_warnings_reference, ProblemScanner,
};
use crate::config::environment::{ensure_parent_dir, Environment};
use crate::config::types::Result;
use crate::pipeline::steps::{step_compile_c, step_compile_c_syntax_only, step_execute};
use crate::pipeline::Test;

pub const WARN_CFLAGS: &str = " -Wall -W";

/// Compile, then run the program and compare its output with `<file>.ref`.
///
/// Under memcheck only the compiler is examined, so no execute step is added.
pub fn make_c_test(mut environment: Environment, filename: &str) -> Result<Test> {
    environment.setup_c(filename);
    let executable = environment.derive_executable();
    ensure_parent_dir(&executable)?;

    // Built before the test so a missing reference fails without running anything.
    let reference_output = if environment.memcheck {
        None
    } else {
        Some(create_check_reference_output(&environment)?)
    };

    let mut test = Test::new(environment, filename);
    test.add_step("compile", step_compile_c)
        .add_check(ProblemScanner::frontend())
        .add_check(check_no_errors)
        .add_check(ProblemScanner::backend())
        .add_check(check_retcode_zero)
        .add_check(check_memcheck_output);

    if let Some(reference_output) = reference_output {
        test.add_step("execute", step_execute)
            .add_check(check_retcode_zero)
            .add_boxed_check(reference_output);
    }
    Ok(test)
}

/// `make_c_test` with extra compiler flags.
pub fn make_c_test_with_cflags(
    mut environment: Environment,
    filename: &str,
    cflags: &str,
) -> Result<Test> {
    environment.append_cflags(cflags);
    make_c_test(environment, filename)
}

/// The compiler must reject the file with the errors listed in `<file>.ref`.
pub fn make_c_should_fail(
    mut environment: Environment,
    filename: &str,
    cflags: &str,
) -> Result<Test> {
    environment.setup_c(filename);
    environment.append_cflags(cflags);
    let errors_reference = create_check_errors_reference(&environment)?;

    let mut test = Test::new(environment, filename);
    test.add_step("compile", step_compile_c_syntax_only)
        .add_boxed_check(errors_reference);
    Ok(test)
}

/// The compiler must accept the file with the warnings listed in `<file>.ref`.
pub fn make_c_should_warn(
    mut environment: Environment,
    filename: &str,
    cflags: &str,
) -> Result<Test> {
    environment.setup_c(filename);
    environment.append_cflags(cflags);
    let warnings_reference = create_check_warnings_reference(&environment)?;

    let mut test = Test::new(environment, filename);
    test.add_step("compile", step_compile_c_syntax_only)
        .add_check(check_retcode_zero)
        .add_check(check_no_errors)
        .add_boxed_check(warnings_reference);
    Ok(test)
}

/// The compiler must accept the file without any warning.
pub fn make_c_should_not_warn(mut environment: Environment, filename: &str) -> Result<Test> {
    environment.setup_c(filename);
    environment.append_cflags(WARN_CFLAGS);

    let mut test = Test::new(environment, filename);
    test.add_step("compile", step_compile_c_syntax_only)
        .add_check(check_no_errors)
        .add_check(check_no_warnings)
        .add_check(check_retcode_zero);
    Ok(test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::HarnessError;
    use std::fs;
    use std::path::PathBuf;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("harness_test_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_c_test_requires_reference_output() {
        let dir = scratch("factory_noref");
        let source = dir.join("hello.c").display().to_string();
        let env = Environment {
            builddir: dir.join("build"),
            ..Environment::default()
        };
        assert!(matches!(
            make_c_test(env, &source),
            Err(HarnessError::MissingReference(_))
        ));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_c_test_layout() {
        let dir = scratch("factory_layout");
        let source = dir.join("hello.c").display().to_string();
        fs::write(format!("{}.ref", source), "hello\n").unwrap();
        let env = Environment {
            builddir: dir.join("build"),
            ..Environment::default()
        };

        let test = make_c_test(env, &source).unwrap();
        let names: Vec<&str> = test.steps().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["compile", "execute"]);
        assert_eq!(test.steps()[0].check_count(), 5);
        assert_eq!(test.steps()[1].check_count(), 2);

        let exe = test.environment().executable.clone().unwrap();
        assert!(exe.parent().unwrap().is_dir());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_memcheck_skips_execute() {
        let dir = scratch("factory_memcheck");
        let source = dir.join("leak.c").display().to_string();
        let env = Environment {
            builddir: dir.join("build"),
            memcheck: true,
            ..Environment::default()
        };
        let test = make_c_test(env, &source).unwrap();
        assert_eq!(test.steps().len(), 1);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_should_warn_flags() {
        let test = make_c_should_warn(Environment::default(), "C/should_warn/w.c", WARN_CFLAGS)
            .unwrap();
        assert!(test.environment().cflags.ends_with(" -Wall -W"));
        assert_eq!(test.steps().len(), 1);
        assert_eq!(test.steps()[0].check_count(), 3);
    }

    #[test]
    fn test_should_not_warn() {
        let test = make_c_should_not_warn(Environment::default(), "C/nowarn/n.c").unwrap();
        assert_eq!(test.steps()[0].name(), "compile");
        assert_eq!(test.steps()[0].check_count(), 3);
    }
}
