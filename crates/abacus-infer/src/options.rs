/// Default depth for rendering type expressions in diagnostics.
pub const DEFAULT_RENDER_DEPTH: usize = 6;

/// Options controlling an inference pass.
#[derive(clap::Args, Debug, Clone, PartialEq, Eq)]
#[command(rename_all = "kebab-case")]
pub struct InferenceOptions {
    /// Maximum depth when rendering types in diagnostics.
    ///
    /// Deeper (or cyclic) structure is rendered as `...`.
    #[arg(long, default_value = "6", env = "ABACUS_RENDER_DEPTH")]
    pub render_depth: usize,

    /// Stop checking a formula after the first type error.
    #[arg(long, action)]
    pub stop_at_first_error: bool,

    /// Do not suggest similarly named functions and references.
    #[arg(long, action)]
    pub no_nearest_matches: bool,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            render_depth: DEFAULT_RENDER_DEPTH,
            stop_at_first_error: false,
            no_nearest_matches: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(clap::Parser, Debug)]
    struct TestArgs {
        #[command(flatten)]
        options: InferenceOptions,
    }

    #[test]
    fn test_flags() {
        let args = TestArgs::try_parse_from([
            "abacus",
            "--render-depth",
            "3",
            "--stop-at-first-error",
        ])
        .unwrap();
        assert_eq!(
            args.options,
            InferenceOptions {
                render_depth: 3,
                stop_at_first_error: true,
                no_nearest_matches: false,
            }
        );
    }

    #[test]
    fn test_rejects_invalid_depth() {
        assert!(TestArgs::try_parse_from(["abacus", "--render-depth", "deep"]).is_err());
    }
}
