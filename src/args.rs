use clap::Parser;

/// This is a scoring program for WOCA surveys.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file describing the survey and its rules, in JSON format.
    /// For more information about the file format, read the documentation of the manual.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the summary of a survey in JSON format. If provided, wocascore will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the survey will be written in JSON format to the given
    /// location. Setting this option overrides the output directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The file containing the responses. Setting this option overrides the sources
    /// that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv, excel or json.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. The first worksheet is used by default.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (default 3) The minimum number of participants to compute the group results.
    #[clap(long, value_parser)]
    pub min_participants: Option<u32>,

    /// (default priorityOrder) How to choose the dominant zone in case of a tie: priorityOrder, noDominant or random.
    /// The random mode requires --random-seed.
    #[clap(long, value_parser)]
    pub tiebreak: Option<String>,

    /// (number) The seed of the random tiebreak mode. The same seed always picks the same zone.
    #[clap(long, value_parser)]
    pub random_seed: Option<u32>,

    /// (number between 1 and 5) If specified, only classifies this overall score and prints its zone.
    #[clap(long, value_parser)]
    pub overall_score: Option<f64>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
