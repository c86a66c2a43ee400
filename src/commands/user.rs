use clap::{Args, Subcommand};
use sfms_core::{FitnessService, Gender, Profile};

use super::{prompt, Credentials, OutputFormat};

#[derive(Args)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

/// Profile fields. Required on register, optional on update.
#[derive(Args)]
pub struct ProfileArgs {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Age in years
    #[arg(long)]
    pub age: Option<u32>,

    /// Gender (male, female, other)
    #[arg(long)]
    pub gender: Option<String>,

    /// Height in centimetres
    #[arg(long)]
    pub height: Option<f64>,

    /// Weight in kilograms
    #[arg(long)]
    pub weight: Option<f64>,
}

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// Register a new user
    Register {
        #[command(flatten)]
        credentials: Credentials,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Show a user's profile
    Show {
        #[command(flatten)]
        credentials: Credentials,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update profile fields
    Update {
        #[command(flatten)]
        credentials: Credentials,

        #[command(flatten)]
        profile: ProfileArgs,
    },

    /// Change password
    Passwd {
        #[command(flatten)]
        credentials: Credentials,

        /// New password (prompted for when omitted)
        #[arg(long)]
        new_password: Option<String>,
    },

    /// Delete a user and all of their records
    Delete {
        #[command(flatten)]
        credentials: Credentials,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

impl ProfileArgs {
    fn gender(&self) -> Result<Option<Gender>, String> {
        self.gender.as_deref().map(str::parse::<Gender>).transpose()
    }

    fn into_profile(self) -> Result<Profile, Box<dyn std::error::Error>> {
        let gender = self.gender()?.ok_or("--gender is required")?;
        Ok(Profile::new(
            self.name.ok_or("--name is required")?,
            self.age.ok_or("--age is required")?,
            gender,
            self.height.ok_or("--height is required")?,
            self.weight.ok_or("--weight is required")?,
        ))
    }

    fn apply_to(self, mut profile: Profile) -> Result<Profile, String> {
        if let Some(gender) = self.gender()? {
            profile.gender = gender;
        }
        if let Some(name) = self.name {
            profile.name = name;
        }
        if let Some(age) = self.age {
            profile.age = age;
        }
        if let Some(height) = self.height {
            profile.height_cm = height;
        }
        if let Some(weight) = self.weight {
            profile.weight_kg = weight;
        }
        Ok(profile)
    }
}

impl UserCommand {
    pub fn run(self, service: &mut dyn FitnessService) -> Result<(), Box<dyn std::error::Error>> {
        match self.command {
            UserSubcommand::Register {
                credentials,
                profile,
            } => {
                let profile = profile.into_profile()?;
                let password = credentials.password()?;
                let id = service.register_user(&credentials.user, &password, profile)?;
                println!("Registered user '{}'", id);
                Ok(())
            }

            UserSubcommand::Show {
                credentials,
                format,
            } => {
                let user = credentials.login(service)?;
                match format {
                    OutputFormat::Json => {
                        let value = serde_json::json!({
                            "username": user.username,
                            "profile": user.profile,
                            "bmi": user.profile.bmi(),
                            "created_at": user.created_at,
                        });
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    }
                    OutputFormat::Text => println!("{}", user),
                }
                Ok(())
            }

            UserSubcommand::Update {
                credentials,
                profile,
            } => {
                let user = credentials.login(service)?;
                let updated = profile.apply_to(user.profile)?;
                let user = service.update_profile(&user.username, updated)?;
                println!("Updated profile:\n");
                println!("{}", user);
                Ok(())
            }

            UserSubcommand::Passwd {
                credentials,
                new_password,
            } => {
                let current = credentials.password()?;
                let new = match new_password {
                    Some(p) => p,
                    None => {
                        let first = prompt("New password: ")?;
                        let second = prompt("Repeat new password: ")?;
                        if first != second {
                            return Err("Passwords do not match".into());
                        }
                        first
                    }
                };
                service.change_password(&credentials.user, &current, &new)?;
                println!("Password changed for '{}'", credentials.user);
                Ok(())
            }

            UserSubcommand::Delete { credentials, yes } => {
                let user = credentials.login(service)?;
                if !yes {
                    let answer = prompt(&format!(
                        "Delete user '{}' and all of their records? [y/N] ",
                        user.username
                    ))?;
                    if !answer.eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }
                service.delete_user(&user.username)?;
                println!("Deleted user '{}'", user.username);
                Ok(())
            }
        }
    }
}
