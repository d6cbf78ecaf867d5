//! Serialized size helpers for batching layers.
//!
//! Bundlers need to know how large a request will be on the wire before deciding whether it
//! fits into the current batch. [`byte_length_function`] turns any [`MessageEncoder`] into such
//! a measuring function; [`ProstEncoder`] adapts generated protobuf types.

// std
use std::{convert::Infallible, marker::PhantomData};
// crates.io
use prost::Message;
// self
use crate::_prelude::*;

/// Encoder that serializes records of one message type.
pub trait MessageEncoder {
	/// Record type accepted by the encoder.
	type Message: ?Sized;
	/// Failure raised while encoding.
	type Error;

	/// Serializes `message` into its wire representation.
	fn encode(&self, message: &Self::Message) -> Result<Vec<u8>, Self::Error>;
}

/// Returns a function that reports the serialized length of a record in bytes.
///
/// Encoder failures are passed through unchanged.
pub fn byte_length_function<E>(encoder: E) -> impl Fn(&E::Message) -> Result<usize, E::Error>
where
	E: MessageEncoder,
{
	move |message| encoder.encode(message).map(|buffer| buffer.len())
}

/// [`MessageEncoder`] for generated prost messages.
pub struct ProstEncoder<M>(PhantomData<fn(&M)>);
impl<M> ProstEncoder<M> {
	/// Creates an encoder for `M`.
	pub const fn new() -> Self {
		Self(PhantomData)
	}
}
impl<M> Clone for ProstEncoder<M> {
	fn clone(&self) -> Self {
		*self
	}
}
impl<M> Copy for ProstEncoder<M> {}
impl<M> Default for ProstEncoder<M> {
	fn default() -> Self {
		Self::new()
	}
}
impl<M> Debug for ProstEncoder<M> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("ProstEncoder")
	}
}
impl<M> MessageEncoder for ProstEncoder<M>
where
	M: Message,
{
	type Error = Infallible;
	type Message = M;

	fn encode(&self, message: &M) -> Result<Vec<u8>, Infallible> {
		Ok(message.encode_to_vec())
	}
}

/// Shortcut returning the serialized length of any prost message.
pub fn prost_byte_length<M>() -> fn(&M) -> usize
where
	M: Message,
{
	|message| message.encode_to_vec().len()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[derive(Clone, PartialEq, Message)]
	struct PublishRequest {
		#[prost(string, tag = "1")]
		topic: String,
		#[prost(bytes = "vec", repeated, tag = "2")]
		messages: Vec<Vec<u8>>,
	}

	struct FixedEncoder(usize);
	impl MessageEncoder for FixedEncoder {
		type Error = &'static str;
		type Message = str;

		fn encode(&self, message: &str) -> Result<Vec<u8>, Self::Error> {
			if message.is_empty() { Err("empty record") } else { Ok(vec![0; self.0]) }
		}
	}

	#[test]
	fn length_matches_encoder_output() {
		let byte_length = byte_length_function(FixedEncoder(17));

		assert_eq!(byte_length("record"), Ok(17));
		assert_eq!(byte_length(""), Err("empty record"));
	}

	#[test]
	fn prost_lengths_match_wire_size() {
		let request = PublishRequest {
			topic: "projects/p/topics/t".into(),
			messages: vec![b"hello".to_vec(), b"world!".to_vec()],
		};
		let byte_length = byte_length_function(ProstEncoder::<PublishRequest>::new());

		assert_eq!(byte_length(&request), Ok(request.encoded_len()));
		assert_eq!(prost_byte_length::<PublishRequest>()(&request), request.encoded_len());
		// 2 + 19 for the topic, 2 + 5 and 2 + 6 for the payloads.
		assert_eq!(request.encoded_len(), 36);
		assert_eq!(prost_byte_length::<PublishRequest>()(&PublishRequest::default()), 0);
	}
}
