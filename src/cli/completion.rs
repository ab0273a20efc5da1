//! Shell completion generation for forge
//!
//! This module generates completion scripts for bash, zsh, fish, elvish,
//! and PowerShell. For bash, zsh, and fish the generated script is extended
//! with a dynamic bridge that calls the hidden `forge __complete` entry
//! point, so candidates coming from the Action engine (repositories,
//! labels, config values) appear at the prompt.

use clap::CommandFactory;
use clap_complete::{Shell, generate};

use crate::cli::CliArgs;
use crate::error::{ForgeError, Result};

/// Generate a completion script and print it to stdout.
///
/// # Arguments
/// * `shell_name` - Shell type (bash, zsh, fish, powershell, elvish)
pub fn generate_completion(shell_name: &str) -> Result<()> {
    let shell = parse_shell(shell_name)?;

    let script = match shell {
        Shell::Bash => bash_script(),
        Shell::Zsh => zsh_script(),
        Shell::Fish => fish_script(),
        // No dynamic bridge for these; the static script still covers
        // commands and flags.
        other => base_script(other),
    };

    print!("{script}");
    Ok(())
}

/// Parse a shell name string to a Shell value.
fn parse_shell(shell_name: &str) -> Result<Shell> {
    match shell_name.to_lowercase().as_str() {
        "bash" => Ok(Shell::Bash),
        "zsh" => Ok(Shell::Zsh),
        "fish" => Ok(Shell::Fish),
        "powershell" => Ok(Shell::PowerShell),
        "elvish" => Ok(Shell::Elvish),
        _ => Err(ForgeError::Generic(format!(
            "Unsupported shell: {shell_name}. Supported shells: bash, zsh, fish, powershell, elvish"
        ))),
    }
}

/// Statically generated script for a shell, without the dynamic bridge.
fn base_script(shell: Shell) -> String {
    let mut cmd = CliArgs::command();
    let mut buffer = Vec::new();
    generate(shell, &mut cmd, "forge", &mut buffer);
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Bash completion with the dynamic `__complete` bridge.
fn bash_script() -> String {
    format!(
        r#"{}

# Dynamic completion driven by `forge __complete`
_forge_dynamic() {{
    local cur="${{COMP_WORDS[COMP_CWORD]}}"
    local -a lines values
    mapfile -t lines < <(forge __complete "${{COMP_WORDS[@]:1:COMP_CWORD}}" 2>/dev/null)
    local line
    for line in "${{lines[@]}}"; do
        values+=("${{line%%$'\t'*}}")
    done
    if [ ${{#values[@]}} -gt 0 ]; then
        COMPREPLY=($(compgen -W "${{values[*]}}" -- "$cur"))
        return 0
    fi
    # Fall back to the static completion
    _forge "$@"
}}

complete -F _forge_dynamic forge
"#,
        base_script(Shell::Bash)
    )
}

/// Zsh completion with the dynamic `__complete` bridge.
fn zsh_script() -> String {
    format!(
        r#"{}

# Dynamic completion driven by `forge __complete`
_forge_dynamic() {{
    local -a candidates
    local line
    while IFS= read -r line; do
        candidates+=("${{line/$'\t'/:}}")
    done < <(forge __complete "${{words[@]:1:CURRENT-1}}" 2>/dev/null)
    if (( ${{#candidates[@]}} )); then
        _describe 'forge' candidates
        return 0
    fi
    # Fall back to the static completion
    _forge "$@"
}}

compdef _forge_dynamic forge
"#,
        base_script(Shell::Zsh)
    )
}

/// Fish completion with the dynamic `__complete` bridge.
///
/// Fish renders `value\tdescription` lines natively, so the bridge just
/// forwards the engine output.
fn fish_script() -> String {
    format!(
        r#"{}

# Dynamic completion driven by `forge __complete`
function __forge_dynamic
    set -l tokens (commandline -opc) (commandline -ct)
    forge __complete $tokens[2..] 2>/dev/null
end

complete -c forge -f -a "(__forge_dynamic)"
"#,
        base_script(Shell::Fish)
    )
}
