use std::{fs::File, sync::Mutex};

use fieldkit::{
    DynamicForm, FormOptions, FormUI,
    form::values_to_json,
    io::load_fields_value,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Logs go to the file named by `FIELDKIT_LOG`; the terminal belongs to the form.
fn init_tracing() -> AppResult<()> {
    let Ok(path) = std::env::var("FIELDKIT_LOG") else {
        return Ok(());
    };
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fieldkit=debug")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn main() -> AppResult<()> {
    init_tracing()?;

    let document = json!({
      "fields": [
        {
          "name": "email",
          "label": "Email",
          "type": "email",
          "placeholder": "you@example.com",
          "validators": ["validate_required", "validate_email"]
        },
        {
          "name": "password",
          "label": "Password",
          "type": "password",
          "validators": [
            "validate_required",
            { "key": "validate_password", "options": { "minLength": 8 } }
          ],
          "inputProps": {
            "helperText": "At least 8 characters with upper case, lower case and a digit."
          }
        },
        {
          "name": "phone",
          "label": "Mobile",
          "type": "tel",
          "validators": [
            "validate_required",
            { "key": "validate_mobile", "options": { "minDigits": 12, "maxDigits": 12 } }
          ],
          "inputProps": { "telPattern": "+91 xxxx xxx xxx" }
        },
        {
          "name": "website",
          "label": "Website",
          "type": "url",
          "validators": ["validate_required", "validate_url"]
        },
        {
          "name": "birthday",
          "label": "Birthday",
          "type": "date",
          "inputProps": { "firstDayOfWeek": 1, "maxDate": "2010-12-31" }
        },
        {
          "name": "meeting",
          "label": "Preferred call time",
          "type": "time",
          "defaultValue": "09:30",
          "inputProps": {
            "hourFormat": "12h",
            "minuteStep": 15,
            "minTime": "08:00",
            "maxTime": "18:00"
          }
        }
      ]
    });

    let fields = load_fields_value(&document)?;
    let form = DynamicForm::new(fields, FormOptions::default().with_submit_label("Sign up"))?;
    let values = FormUI::new(form).with_title("fieldkit demo").run()?;

    println!("{}", serde_json::to_string_pretty(&values_to_json(&values))?);
    Ok(())
}
