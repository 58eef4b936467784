use convgen_asciidoctor::{
    BackendId, ConverterConfig, ConverterGenerator, ValidationError, generate_converter,
};
use convgen_core::{is_syntactically_valid, pretty_print};

fn separator(title: &str) -> String {
    let dashes = "-".repeat((76 - title.len()) / 2);
    format!("#{dashes} {title} {dashes}#\n")
}

fn generate(config: ConverterConfig) -> String {
    ConverterGenerator::new(config).unwrap().generate()
}

const HELPERS: &str = "module Helpers\n  EOL = \"\\n\"\n\n  def help_me\n    puts 'ok'\n  end\nend\n";

#[test]
fn test_end_to_end_output() {
    let config = ConverterConfig::new("My::Converter").with_transform("document", "x = 1\nx");
    let expected = [
        "# This file has been generated!\n",
        "\n",
        "module My; end\n",
        "class My::Converter < ::Asciidoctor::Converter::Base\n",
        "\n",
        "  def initialize(backend, opts = {})\n",
        "    super\n",
        "  end\n",
        "\n",
        "  def convert(node, transform = nil, opts = {})\n",
        "    transform ||= node.node_name\n",
        "    converter = self\n",
        "\n",
        "    if opts.empty?\n",
        "      converter.send(transform, node)\n",
        "    else\n",
        "      converter.send(transform, node, opts)\n",
        "    end\n",
        "  end\n",
        "\n",
        format!("  {}", separator("Begin of generated transformation methods")).as_str(),
        "\n",
        "  def document(node, opts = {})\n",
        "    node.instance_eval do\n",
        "      converter.set_local_variables(binding, opts) unless opts.empty?\n",
        "      x = 1\n",
        "      x\n",
        "    end\n",
        "  end\n",
        format!("  {}", separator("End of generated transformation methods")).as_str(),
        "  def set_local_variables(binding, vars)\n",
        "    vars.each do |key, val|\n",
        "      binding.local_variable_set(key.to_sym, val)\n",
        "    end\n",
        "  end\n",
        "\n",
        "end\n",
    ]
    .concat();

    let output = generate(config);
    assert_eq!(output, expected);
    assert!(is_syntactically_valid(&output));
}

#[test]
fn test_generate_is_idempotent() {
    let config = ConverterConfig::new("Conv")
        .with_helpers(HELPERS)
        .with_delegate_backend("html5")
        .with_transform("paragraph", "'<p>'");
    let generator = ConverterGenerator::new(config).unwrap();
    assert_eq!(generator.generate(), generator.generate());
}

#[test]
fn test_generate_into_writes_to_sink() {
    let generator = ConverterGenerator::new(ConverterConfig::new("Conv")).unwrap();
    let out = generator.generate_into(String::from("# prefix\n")).unwrap();
    assert!(out.starts_with("# prefix\n# This file has been generated!\n"));
    assert!(out.ends_with("end\n"));
}

#[test]
fn test_top_level_class_has_no_modules() {
    let output = generate(ConverterConfig::new("MyConverter"));
    assert!(output.starts_with("# This file has been generated!\n\n\nclass MyConverter < "));
    assert!(!output.contains("module "));
}

#[test]
fn test_nested_class_declares_modules_first() {
    let output = generate(ConverterConfig::new("Mod1::Mod2::Conv"));
    assert!(output.contains(
        "module Mod1; module Mod2; end end\nclass Mod1::Mod2::Conv < ::Asciidoctor::Converter::Base\n"
    ));
}

#[test]
fn test_helpers_without_module_are_rejected() {
    let config = ConverterConfig::new("Conv").with_helpers("def foo; end");
    assert_eq!(
        ConverterGenerator::new(config).unwrap_err(),
        ValidationError::MissingHelpersModule
    );

    let config = ConverterConfig::new("Conv").with_helpers("module Helpers");
    assert!(ConverterGenerator::new(config).is_err());
}

#[test]
fn test_class_name_is_emitted_as_given() {
    let output = generate(ConverterConfig::new(""));
    assert!(output.contains("\nclass  < ::Asciidoctor::Converter::Base\n"));

    let output = generate(ConverterConfig::new("::Top"));
    assert!(output.starts_with("# This file has been generated!\n\n\nclass ::Top < "));
}

#[test]
fn test_blank_helpers_are_ignored() {
    for helpers in [None, Some(""), Some("  \n\t")] {
        let mut config = ConverterConfig::new("Conv").with_transform("document", "x");
        config.helpers_code = helpers.map(str::to_string);
        let output = generate(config);
        assert!(!output.contains("Helpers.constants"));
        assert!(!output.contains("node.extend(Helpers)"));
        assert!(!output.contains("Begin of Helpers"));
    }
}

#[test]
fn test_helpers_block_layout() {
    let config = ConverterConfig::new("Conv")
        .with_helpers("module Helpers # shared\nend")
        .with_transform("document", "x");
    let output = generate(config);

    let expected = [
        "class Conv < ::Asciidoctor::Converter::Base\n",
        "\n",
        format!("  {}", separator("Begin of Helpers")).as_str(),
        "\n",
        "  module Helpers # shared\n",
        "  end\n",
        "\n",
        "  # Make Helpers' constants accessible from transform methods.\n",
        "  Helpers.constants.each do |const|\n",
        "    const_set(const, Helpers.const_get(const))\n",
        "  end\n",
        "\n",
        format!("  {}", separator("End of Helpers")).as_str(),
        "\n",
        "\n",
        "  def initialize(backend, opts = {})\n",
    ]
    .concat();
    assert!(output.contains(&expected), "{output}");
    assert!(output.contains(
        "  def document(node, opts = {})\n    node.extend(Helpers)\n    node.instance_eval do\n"
    ));
}

#[test]
fn test_helpers_code_is_embedded_verbatim() {
    let output = generate(ConverterConfig::new("Conv").with_helpers(HELPERS));
    assert!(output.contains(&convgen_core::indent(HELPERS, 2)));
}

#[test]
fn test_register_for_variants() {
    let output = generate(ConverterConfig::new("Conv"));
    assert!(!output.contains("register_for"));

    let output = generate(ConverterConfig::new("Conv").with_register_for("html5s"));
    assert!(output.contains("  register_for \"html5s\"\n\n  def initialize"));

    let output = generate(ConverterConfig::new("Conv").with_register_for(["html5s", "html5"]));
    assert!(output.contains("register_for \"html5s\", \"html5\"\n"));

    let symbols = vec![
        BackendId::Symbol("html5s".into()),
        BackendId::Symbol("html5".into()),
    ];
    let output = generate(ConverterConfig::new("Conv").with_register_for(symbols));
    assert!(output.contains("register_for :html5s, :html5\n"));
}

#[test]
fn test_backend_info_in_constructor() {
    let output = generate(
        ConverterConfig::new("Conv")
            .with_backend_info("basebackend", "docbook")
            .with_backend_info("outfilesuffix", ".xml"),
    );
    assert!(output.contains(
        "  def initialize(backend, opts = {})\n    super\n    basebackend \"docbook\"\n    outfilesuffix \".xml\"\n  end\n"
    ));

    let output = generate(ConverterConfig::new("Conv").with_backend_info("supports_templates", true));
    assert!(output.contains("    super\n    supports_templates\n  end\n"));
}

#[test]
fn test_delegate_backend() {
    let output = generate(ConverterConfig::new("Conv"));
    assert!(!output.contains("@delegate_converter"));
    assert!(output.contains("    converter = self\n"));

    let output = generate(ConverterConfig::new("Conv").with_delegate_backend("html5"));
    let constructor = [
        "  def initialize(backend, opts = {})\n",
        "    super\n",
        "\n",
        "    delegate_backend = (opts[:delegate_backend] || \"html5\").to_s\n",
        "    factory = ::Asciidoctor::Converter::Factory\n",
        "\n",
        "    converter = factory.create(delegate_backend, backend_info)\n",
        "    @delegate_converter = if converter == self\n",
        "      factory.new.create(delegate_backend, backend_info)\n",
        "    else\n",
        "      converter\n",
        "    end\n",
        "  end\n",
    ]
    .concat();
    assert!(output.contains(&constructor), "{output}");
    assert!(output.contains(
        "    converter = respond_to?(transform) ? self : @delegate_converter\n"
    ));
}

#[test]
fn test_duplicate_transforms_are_kept_in_order() {
    let output = generate(
        ConverterConfig::new("Conv")
            .with_transform("paragraph", "'first'")
            .with_transform("paragraph", "'second'"),
    );
    assert_eq!(output.matches("  def paragraph(node, opts = {})\n").count(), 2);
    let first = output.find("'first'").unwrap();
    let second = output.find("'second'").unwrap();
    assert!(first < second);
}

#[test]
fn test_full_converter_is_valid_ruby() {
    let fragment = pretty_print(
        "_buf = ''; _buf << (\"<div class=\\\"paragraph\\\">\".freeze); if title?; _buf << title; end; _buf << content; _buf << (\"</div>\".freeze); _buf\n",
        2,
    );
    let config = ConverterConfig::new("Asciidoctor::Html5s::Converter")
        .with_helpers(HELPERS)
        .with_register_for(["html5s"])
        .with_backend_info("basebackend", "html")
        .with_backend_info("supports_templates", true)
        .with_delegate_backend("html5")
        .with_transform("paragraph", fragment)
        .with_transform("inline_image", "\"<inline_image>\"")
        .with_transform("document", "s = \"\"\ns << \"<document>\"");
    let output = generate(config);
    assert!(is_syntactically_valid(&output), "{output}");
}

#[test]
fn test_generate_converter_from_json() {
    let config = ConverterConfig::from_json_str(
        r#"{"className": "Conv", "transforms": {"document": "x"}, "registerFor": ":html5"}"#,
    )
    .unwrap();
    let output = generate_converter(config).unwrap();
    assert!(output.contains("register_for :html5\n"));
    assert!(output.contains("  def document(node, opts = {})\n"));
}
