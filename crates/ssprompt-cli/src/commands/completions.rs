//! Shell completion generation.

use std::io::Write;

use clap::CommandFactory;
use clap_complete::{Generator, generate, shells};

use crate::{
    cli::{Cli, CompletionsArgs, Shell},
    error::CliResult,
};

const BIN_NAME: &str = "ssprompt";

pub fn execute(args: CompletionsArgs) -> CliResult<()> {
    let mut stdout = std::io::stdout().lock();
    write_completions(args.shell, &mut stdout);
    stdout.flush()?;
    Ok(())
}

fn write_completions(shell: Shell, out: &mut dyn Write) {
    match shell {
        Shell::Bash => render(shells::Bash, out),
        Shell::Zsh => render(shells::Zsh, out),
        Shell::Fish => render(shells::Fish, out),
        Shell::PowerShell => render(shells::PowerShell, out),
        Shell::Elvish => render(shells::Elvish, out),
    }
}

fn render<G: Generator>(generator: G, out: &mut dyn Write) {
    generate(generator, &mut Cli::command(), BIN_NAME, out);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bash_script_mentions_subcommands() {
        let mut buf = Vec::new();
        write_completions(Shell::Bash, &mut buf);
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("ssprompt"));
        assert!(script.contains("pull"));
    }
}
