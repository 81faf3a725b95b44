use seasonal_outlook::Outlook;
use std::env;
use std::path::PathBuf;

/// Usage: `predict_country <history.csv[.gz]> <country> <date> [sigma_days]`
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = env::args().skip(1);
    let (Some(path), Some(country), Some(date)) = (args.next(), args.next(), args.next()) else {
        eprintln!("usage: predict_country <history.csv[.gz]> <country> <date> [sigma_days]");
        std::process::exit(2);
    };
    let sigma_days = args.next().map(|s| s.parse::<f64>()).transpose()?;

    let path = PathBuf::from(path);
    let outlook = Outlook::from_csv(&path).call().await?;
    let summary = outlook
        .predict(&country, date.as_str())
        .maybe_sigma_days(sigma_days)
        .call()
        .await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
