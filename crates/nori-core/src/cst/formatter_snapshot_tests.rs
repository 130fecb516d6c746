//! Snapshot tests for the formatter using insta

#[cfg(test)]
mod tests {
    use crate::cst::formatter::{format_source, FormatterConfig};
    use crate::version::PhpVersion;
    use insta::assert_snapshot;

    fn fmt(src: &str) -> String {
        format_source(src, &FormatterConfig::default(), PhpVersion::default()).formatted
    }

    #[test]
    fn class_with_a_method() {
        let source = "<?php class Greeter { public function greet( $name ) { return 'hi ' . $name; } }";
        assert_snapshot!(fmt(source), @r"
        <?php
        class Greeter
        {
            public function greet($name)
            {
                return 'hi ' . $name;
            }
        }
        ");
    }

    #[test]
    fn control_flow_document() {
        let source = "<?php\nif ($a) { one(); } else { two(); }\n$v = match ($x) { 1 => 'one', default => 'many' };\n";
        assert_snapshot!(fmt(source), @r"
        <?php
        if ($a) {
            one();
        } else {
            two();
        }
        $v = match ($x) {
            1 => 'one',
            default => 'many',
        };
        ");
    }

    #[test]
    fn broken_argument_list() {
        let config = FormatterConfig {
            line_width: 40,
            ..FormatterConfig::default()
        };
        let source = "<?php dispatch($firstArgument, $secondArgument, $thirdArgument);";
        let formatted =
            format_source(source, &config, PhpVersion::default()).formatted;
        assert_snapshot!(formatted, @r"
        <?php
        dispatch(
            $firstArgument,
            $secondArgument,
            $thirdArgument,
        );
        ");
    }

    #[test]
    fn formatting_is_idempotent() {
        let source = "<?php class Greeter { public function greet( $name ) { return 'hi ' . $name; } }";
        let once = fmt(source);
        let twice = fmt(&once);
        assert_eq!(once, twice, "Formatting should be idempotent");
    }
}
