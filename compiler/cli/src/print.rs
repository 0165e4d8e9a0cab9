use crate::{
    utils::{read_module, OnlyPath},
    ProgramResult,
};
use colored::{Color, Colorize};
use hoist_frontend::{
    position::Offset,
    rich_ir::{RichIr, RichIrAnnotation, ToRichIr, TokenType},
};

pub(crate) fn print(options: OnlyPath) -> ProgramResult {
    let module = read_module(&options.path)?;
    print_rich_ir(&module.to_rich_ir());
    Ok(())
}

pub fn print_rich_ir(rich_ir: &RichIr) {
    let text = rich_ir.text.as_str();
    let mut displayed_byte = Offset(0);

    for RichIrAnnotation { range, token_type } in &rich_ir.annotations {
        assert!(displayed_byte <= range.start);
        print!("{}", &text[*displayed_byte..*range.start]);

        let in_annotation = &text[*range.start..*range.end];
        let color = match token_type {
            TokenType::Keyword => Color::Magenta,
            TokenType::Symbol => Color::Yellow,
            TokenType::Function => Color::Blue,
            TokenType::Variable => Color::Yellow,
            TokenType::Parameter => Color::Red,
            TokenType::Type => Color::BrightGreen,
            TokenType::Int => Color::Red,
            TokenType::Text => Color::Cyan,
            TokenType::Comment => Color::Green,
        };
        print!("{}", in_annotation.color(color));

        displayed_byte = range.end;
    }
    println!("{}", &text[*displayed_byte..]);
}
