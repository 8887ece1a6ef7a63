//! Scripted form session.

use console_widgets::{ConfirmationField, FormWidget, RangeSelector, RangeValue, SshKeyInput, TextField};
use formwork::prelude::*;
use log::{debug, info};

const DEMO_KEY: &str =
    "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIG4rT3vTt99Ox5kndS4HmgTrKBT8SKzhK4rhGkEVGlCI demo@console";

/// The "add SSH key" form and its widgets.
pub struct Session {
    form: Form,
    key_name: TextField,
    confirm_name: ConfirmationField,
    public_key: SshKeyInput,
    valid_days: RangeSelector,
    comment: NativeInput,
}

impl Session {
    pub fn new() -> Result<Self, console_widgets::WidgetError> {
        let form = Form::new("add-ssh-key");

        let key_name = TextField::new(
            "keyName",
            Rules::new()
                .required("empty")
                .max_length(64, "too-long")
                .try_pattern(r"^[A-Za-z0-9._-]+$", "invalid-name")?
                .message("empty", "Enter a key name.")
                .message("invalid-name", "Use letters, digits, '.', '_' or '-'."),
        )?;
        let confirm_name = ConfirmationField::new("confirmName", "keyName")?;
        let public_key = SshKeyInput::new("publicKey", true)?;
        let valid_days = RangeSelector::new("validDays", 1, 365)?;
        valid_days.set_default_value(RangeValue::new(1, 90));
        valid_days.set_value(RangeValue::new(1, 90));
        let comment = NativeInput::with_value("comment", "added from console");

        key_name.attach(&form);
        confirm_name.attach(&form);
        public_key.attach(&form);
        valid_days.attach(&form);
        form.register(FormParticipant::Native(comment.clone()));

        Ok(Self {
            form,
            key_name,
            confirm_name,
            public_key,
            valid_days,
            comment,
        })
    }

    /// Flush pending changes on every widget, as a host would once per frame.
    fn tick(&self) {
        let outcomes = [
            ("keyName", self.key_name.update()),
            ("confirmName", self.confirm_name.update()),
            ("publicKey", self.public_key.update()),
            ("validDays", self.valid_days.update()),
        ];
        for (name, outcome) in outcomes {
            debug!("tick: {} -> {:?}", name, outcome);
        }
    }

    fn print_errors(&self) {
        let fields: [(&str, Option<ErrorMessage>); 4] = [
            ("keyName", self.key_name.error_message()),
            ("confirmName", self.confirm_name.error_message()),
            ("publicKey", self.public_key.error_message()),
            ("validDays", self.valid_days.error_message()),
        ];
        for (name, message) in fields {
            if let Some(message) = message.filter(|message| !message.is_empty()) {
                println!("  {:<12} {}", name, message);
            }
        }
    }

    /// Hide every visible message, as a host does once the user edits.
    fn clear_errors(&self) {
        self.key_name.element().set_error_message(None);
        self.confirm_name.element().set_error_message(None);
        self.public_key.element().set_error_message(None);
        self.valid_days.element().set_error_message(None);
    }

    fn submit(&self) -> Result<bool, serde_json::Error> {
        match self.form.submit() {
            Submission::Accepted(data) => {
                println!("submitted:");
                println!("{}", serde_json::to_string_pretty(&data)?);
                Ok(true)
            }
            Submission::Blocked { invalid } => {
                println!("blocked by {} field(s):", invalid.len());
                self.print_errors();
                Ok(false)
            }
        }
    }

    /// Run the script: submit empty, fix the fields, submit, reset.
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.tick();
        info!("form '{}' ready with {} participants", self.form.name(), self.form.len());

        println!("# submit an empty form");
        self.submit()?;
        self.tick();

        println!("# fill in the fields");
        self.key_name.set_value("laptop");
        self.confirm_name.set_value("laptop");
        self.public_key.set_allowed_key_types_str("ssh-ed25519, ecdsa-sha2-nistp256")?;
        self.public_key.set_value("ssh-rsa AAAAB3NzaC1yc2EAAAADAQABAAABAQ");
        self.valid_days.set_end(400);
        self.clear_errors();
        self.tick();

        self.public_key.report_validity();
        self.valid_days.report_validity();
        self.print_errors();
        self.tick();

        println!("# correct the key and the range");
        self.public_key.set_value(DEMO_KEY);
        self.valid_days.set_end(30);
        self.clear_errors();
        self.tick();

        if self.submit()? {
            info!("submission accepted");
        }

        println!("# reset");
        self.form.reset();
        self.tick();
        println!(
            "  keyName = {:?}, validDays = {}, comment = {:?}",
            self.key_name.value(),
            self.valid_days.value(),
            self.comment.value()
        );
        println!("  form valid: {}", self.form.check_validity());
        Ok(())
    }
}
