extern crate pretty_env_logger;

use std::path::PathBuf;
use std::process::exit;

use clap::{arg, command, value_parser, Command};

use bubble_sheet_grader::annotate::load_font;
use bubble_sheet_grader::{grade_sheet_files, ExamDefinition, GradeFileError, GradeOptions};

fn main() {
    pretty_env_logger::init_custom_env("LOG");

    let matches = cli().get_matches();
    let debug = matches.get_flag("debug");
    let exam_path = matches
        .get_one::<PathBuf>("exam")
        .expect("exam path is required");
    let output_dir = matches.get_one::<PathBuf>("output_dir");
    let font_path = matches.get_one::<PathBuf>("font");
    let image_paths = matches
        .get_many::<PathBuf>("images")
        .expect("at least one image path is required")
        .cloned()
        .collect::<Vec<PathBuf>>();

    let exam = match ExamDefinition::load(exam_path) {
        Ok(exam) => exam,
        Err(e) => {
            eprintln!("Error loading exam definition: {}", e);
            exit(1);
        }
    };

    let mut options = GradeOptions::from_exam(&exam);
    if let Some(font_path) = font_path {
        options = match load_font(font_path) {
            Ok(font) => options.with_font(font),
            Err(e) => {
                eprintln!("Error loading font: {}", e);
                exit(1);
            }
        };
    }

    if let Some(output_dir) = output_dir {
        if let Err(e) = std::fs::create_dir_all(output_dir) {
            eprintln!(
                "Error creating output directory {}: {}",
                output_dir.display(),
                e
            );
            exit(1);
        }
    }

    let results = grade_sheet_files(
        &image_paths,
        output_dir.map(PathBuf::as_path),
        &options,
        debug,
    );

    let mut failed = false;
    for (path, result) in image_paths.iter().zip(results) {
        match result {
            Ok(graded) => match serde_json::to_string_pretty(&graded) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error serializing result for {}: {}", path.display(), e);
                    failed = true;
                }
            },
            Err(GradeFileError::Grade(e)) => {
                eprintln!("{}: {}", path.display(), e);
                eprintln!("{}", e.advice());
                failed = true;
            }
            Err(e) => {
                eprintln!("{}: {}", path.display(), e);
                failed = true;
            }
        }
    }

    if failed {
        exit(1);
    }
}

fn cli() -> Command {
    command!()
        .about("Grades photographed multiple-choice bubble sheets")
        .arg(
            arg!(-e --exam <PATH> "Path to exam definition JSON file")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(output_dir: -o --"output-dir" <DIR> "Directory for annotated sheet images")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(--font <PATH> "TrueType font used to write the score on annotated sheets")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(arg!(-d --debug "Write intermediate debug images next to each input"))
        .arg(
            arg!(images: <IMAGE> ... "Paths to sheet images")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn parses_multiple_images() {
        let matches = cli()
            .try_get_matches_from([
                "bubble-sheet-grader",
                "-e",
                "exam.json",
                "--output-dir",
                "out",
                "a.jpg",
                "b.jpg",
            ])
            .expect("valid arguments");

        assert_eq!(
            matches.get_one::<PathBuf>("exam"),
            Some(&PathBuf::from("exam.json"))
        );
        assert_eq!(
            matches.get_one::<PathBuf>("output_dir"),
            Some(&PathBuf::from("out"))
        );
        assert_eq!(
            matches
                .get_many::<PathBuf>("images")
                .expect("images")
                .collect::<Vec<_>>(),
            [&PathBuf::from("a.jpg"), &PathBuf::from("b.jpg")]
        );
        assert!(!matches.get_flag("debug"));
    }
}
