//! Device parameters and the recording switch.
//!
//! The device defines the parameter vocabulary; names and values are passed
//! through unchecked.  A non-zero `result_code` is returned as data, not as
//! an error.
//!
//! Recording state lags: the device acknowledges `rec` writes before it has
//! actually started or stopped recording.  Calling [`Dashcam::is_recording`]
//! right after [`Dashcam::start_recording`] will usually still report the
//! old state.  Callers that need confirmation have to poll on their own
//! schedule.

use dashcam_common::protocol::{
    GetParamResponse, ParamValue, ParamWrite, RecordingCommand, GET_PARAM_ENDPOINT, REC_PARAM,
    SET_PARAM_ENDPOINT,
};
use tracing::debug;

use crate::error::Result;
use crate::transport::Query;
use crate::Dashcam;

impl Dashcam {
    pub async fn get_param(&self, name: &str) -> Result<ParamValue> {
        let resp: GetParamResponse = self
            .transport
            .get_json(GET_PARAM_ENDPOINT, Query::Pairs(&[("param", name)]))
            .await?;
        Ok(resp.into())
    }

    pub async fn set_param(&self, name: &str, value: &str) -> Result<ParamWrite> {
        let resp: ParamWrite = self
            .transport
            .get_json(
                SET_PARAM_ENDPOINT,
                Query::Pairs(&[("param", name), ("value", value)]),
            )
            .await?;
        debug!("set {name}={value}: {} ({})", resp.result_code, resp.message);
        Ok(resp)
    }

    /// Write the `rec` parameter.  See the module docs on state lag.
    pub async fn set_recording(&self, command: RecordingCommand) -> Result<ParamWrite> {
        self.set_param(REC_PARAM, command.param_value()).await
    }

    /// Ask the device to start recording.
    ///
    /// A successful response does not mean [`Dashcam::is_recording`] will
    /// return `true` yet.
    pub async fn start_recording(&self) -> Result<ParamWrite> {
        self.set_recording(RecordingCommand::Start).await
    }

    /// Ask the device to stop recording.
    ///
    /// A successful response does not mean [`Dashcam::is_recording`] will
    /// return `false` yet.
    pub async fn stop_recording(&self) -> Result<ParamWrite> {
        self.set_recording(RecordingCommand::Stop).await
    }

    /// Whether the device reports `rec == 1`.
    ///
    /// Does not immediately reflect [`Dashcam::start_recording`] or
    /// [`Dashcam::stop_recording`].  The read's `result_code` is not
    /// checked; a failed read reports whatever value the device sent.
    pub async fn is_recording(&self) -> Result<bool> {
        let param = self.get_param(REC_PARAM).await?;
        Ok(is_recording_value(param.value))
    }
}

fn is_recording_value(value: i64) -> bool {
    value == 1
}
