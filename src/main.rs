// gordian: run Gordian scripts from the command line

use std::fs;
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::style::Stylize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gordian::interpreter::callables::Signature;
use gordian::interpreter::engine::{Interpreter, InterpreterConfig};
use gordian::interpreter::errors::ScriptError;
use gordian::memory::scope::Scope;
use gordian::memory::value::{Value, ValueKind};

const USAGE: &str = "\
Usage: gordian [options] <script>
       gordian [options] -c <source>

Options:
  -c <source>        Run <source> instead of a file
  --max-depth=<n>    Maximum nested call depth (default 256)
  -h, --help         Show this message
  -V, --version      Show the version

Set RUST_LOG (for example RUST_LOG=gordian=debug) to see interpreter logs.";

/// What the command line asked for
enum Command {
    Run {
        name: String,
        source: String,
        config: InterpreterConfig,
    },
    Help,
    Version,
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut config = InterpreterConfig::default();
    let mut script: Option<(String, String)> = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "-h" | "--help" => return Ok(Command::Help),
            "-V" | "--version" => return Ok(Command::Version),
            "-c" => {
                let source = iter.next().ok_or("-c needs a script argument")?;
                script = Some(("<command line>".to_string(), source.clone()));
            }
            _ if arg.starts_with("--max-depth=") => {
                let value = &arg["--max-depth=".len()..];
                config.max_call_depth = value
                    .parse()
                    .map_err(|_| format!("invalid --max-depth value '{}'", value))?;
            }
            _ if arg.starts_with('-') => return Err(format!("unknown option '{}'", arg)),
            path => {
                let source = fs::read_to_string(path)
                    .map_err(|err| format!("cannot read '{}': {}", path, err))?;
                script = Some((path.to_string(), source));
            }
        }
    }

    let (name, source) = script.ok_or("no script given")?;
    Ok(Command::Run {
        name,
        source,
        config,
    })
}

/// Install the host callables every CLI script can use.
fn register_natives(scope: &Arc<Scope>) -> Result<(), ScriptError> {
    let started = Instant::now();

    scope.register_method("print", Signature::any(1), |args| {
        println!("{}", args[0]);
        Ok(Value::Null)
    })?;
    scope.register_method("sleep", Signature::new([ValueKind::Number]), |args| {
        let millis = args[0].expect_number()?.max(0.0);
        let duration = Duration::try_from_secs_f64(millis / 1000.0).map_err(|_| {
            ScriptError::native("sleep", format!("cannot sleep for {} ms", millis))
        })?;
        thread::sleep(duration);
        Ok(Value::Null)
    })?;
    scope.register_returning_method("time", Signature::any(0), move |_| {
        Ok(Value::Number(started.elapsed().as_secs_f64()))
    })?;
    Ok(())
}

fn report(name: &str, err: &ScriptError) {
    eprintln!("{} {}: {}", "error:".red().bold(), name.bold(), err);
}

fn main() -> ExitCode {
    // Logs go to stderr so `print` output stays clean
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (name, source, config) = match parse_args(&args) {
        Ok(Command::Run {
            name,
            source,
            config,
        }) => (name, source, config),
        Ok(Command::Help) => {
            println!("{}", USAGE);
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            println!("gordian {}", env!("CARGO_PKG_VERSION"));
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{} {}", "error:".red().bold(), message);
            eprintln!();
            eprintln!("{}", USAGE);
            return ExitCode::from(2);
        }
    };

    let scope = Scope::root();
    if let Err(err) = register_natives(&scope) {
        report(&name, &err);
        return ExitCode::FAILURE;
    }

    let interpreter = Interpreter::with_config(config);
    match interpreter.run(&source, &scope) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&name, &err);
            ExitCode::FAILURE
        }
    }
}
