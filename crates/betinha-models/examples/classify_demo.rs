//! Demo: how submissions are classified and named
//!
//! Run with: cargo run -p betinha-models --example classify_demo

use betinha_models::{ConversionRequest, Job, OutputFormat};

fn main() {
    let requests = [
        ("https://www.youtube.com/watch?v=dQw4w9WgXcQ", "/tmp/rick", OutputFormat::Mp3),
        ("https://youtu.be/dQw4w9WgXcQ", "/tmp/rick.mp4", OutputFormat::Mp4),
        ("/home/user/holiday.mov", "/tmp/holiday", OutputFormat::Gif),
        ("https://vimeo.com/123456789", "/tmp/vimeo", OutputFormat::Mp4),
    ];

    for (input, output, format) in requests {
        let request = ConversionRequest::new(input, output, format);
        let job = Job::from_request(&request);

        println!("\n{}", "=".repeat(60));
        println!("INPUT: {}", input);
        println!("{}", "=".repeat(60));
        println!(
            "{}",
            serde_json::to_string_pretty(&job).expect("serialization should be infallible")
        );
    }
}
