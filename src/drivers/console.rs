//! Enrollment fields answered by a person

use std::io::{BufRead, Write};

use tracing::trace;

use crate::enrollment::FieldRequest;
use crate::error::Result;
use crate::prompt::Console;
use crate::workflow::Driver;

/// Asks for each field by its localized label; a rejected value is
/// explained before the field is asked again.
impl<R: BufRead, W: Write> Driver<FieldRequest, String> for Console<R, W> {
    fn supply(&mut self, request: &FieldRequest) -> Result<String> {
        let locale = self.locale();
        let label = locale.field_label(request.field);

        if let Some(reason) = &request.rejection {
            self.say(&format!("{}: {} {}", locale.try_again(), label, reason))?;
        }

        let answer = self.ask(&format!("{}:", label))?;
        if !request.field.is_secret() {
            trace!(
                field = %request.field,
                attempt = request.attempt,
                retry = request.is_retry(),
                "Field answered"
            );
        }
        Ok(answer)
    }
}
