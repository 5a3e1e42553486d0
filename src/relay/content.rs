//! Outbound message content union.
//!
//! Inbound Telegram messages are flattened into one closed enum so relay
//! dispatch is exhaustive: adding a content kind is a compile-time change,
//! not a runtime fallthrough.

use teloxide::prelude::*;
use teloxide::types::{DiceEmoji, InputFile, MessageEntity, MessageId, ReplyParameters};

use crate::bot::dispatcher::ThrottledBot;

/// Optional media caption plus its formatting entities.
#[derive(Debug, Clone, Default)]
pub struct Caption {
    pub text: Option<String>,
    pub entities: Vec<MessageEntity>,
}

/// Message content the relay understands.
#[derive(Debug, Clone)]
pub enum RelayContent {
    Text {
        text: String,
        entities: Vec<MessageEntity>,
    },
    Photo {
        file_id: String,
        caption: Caption,
    },
    Document {
        file_id: String,
        caption: Caption,
    },
    Video {
        file_id: String,
        caption: Caption,
    },
    Audio {
        file_id: String,
        caption: Caption,
    },
    Voice {
        file_id: String,
        caption: Caption,
    },
    Animation {
        file_id: String,
        caption: Caption,
    },
    Sticker {
        file_id: String,
    },
    VideoNote {
        file_id: String,
    },
    Contact {
        phone_number: String,
        first_name: String,
        last_name: Option<String>,
        vcard: Option<String>,
    },
    Location {
        latitude: f64,
        longitude: f64,
    },
    Venue {
        latitude: f64,
        longitude: f64,
        title: String,
        address: String,
    },
    Dice {
        emoji: DiceEmoji,
    },
    Unsupported,
}

impl RelayContent {
    pub fn from_message(msg: &Message) -> Self {
        let caption = Caption {
            text: msg.caption().map(str::to_owned),
            entities: msg.caption_entities().map(<[_]>::to_vec).unwrap_or_default(),
        };

        if let Some(text) = msg.text() {
            return Self::Text {
                text: text.to_owned(),
                entities: msg.entities().map(<[_]>::to_vec).unwrap_or_default(),
            };
        }
        if let Some(sizes) = msg.photo() {
            if let Some(largest) = sizes.last() {
                return Self::Photo {
                    file_id: largest.file.id.clone(),
                    caption,
                };
            }
        }
        if let Some(doc) = msg.document() {
            return Self::Document {
                file_id: doc.file.id.clone(),
                caption,
            };
        }
        if let Some(video) = msg.video() {
            return Self::Video {
                file_id: video.file.id.clone(),
                caption,
            };
        }
        if let Some(audio) = msg.audio() {
            return Self::Audio {
                file_id: audio.file.id.clone(),
                caption,
            };
        }
        if let Some(voice) = msg.voice() {
            return Self::Voice {
                file_id: voice.file.id.clone(),
                caption,
            };
        }
        if let Some(animation) = msg.animation() {
            return Self::Animation {
                file_id: animation.file.id.clone(),
                caption,
            };
        }
        if let Some(sticker) = msg.sticker() {
            return Self::Sticker {
                file_id: sticker.file.id.clone(),
            };
        }
        if let Some(note) = msg.video_note() {
            return Self::VideoNote {
                file_id: note.file.id.clone(),
            };
        }
        if let Some(contact) = msg.contact() {
            return Self::Contact {
                phone_number: contact.phone_number.clone(),
                first_name: contact.first_name.clone(),
                last_name: contact.last_name.clone(),
                vcard: contact.vcard.clone(),
            };
        }
        if let Some(venue) = msg.venue() {
            return Self::Venue {
                latitude: venue.location.latitude,
                longitude: venue.location.longitude,
                title: venue.title.clone(),
                address: venue.address.clone(),
            };
        }
        if let Some(location) = msg.location() {
            return Self::Location {
                latitude: location.latitude,
                longitude: location.longitude,
            };
        }
        if let Some(dice) = msg.dice() {
            return Self::Dice { emoji: dice.emoji };
        }
        Self::Unsupported
    }

    /// Bot API method this content maps to; used in admin failure reports.
    pub fn method_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "sendMessage",
            Self::Photo { .. } => "sendPhoto",
            Self::Document { .. } => "sendDocument",
            Self::Video { .. } => "sendVideo",
            Self::Audio { .. } => "sendAudio",
            Self::Voice { .. } => "sendVoice",
            Self::Animation { .. } => "sendAnimation",
            Self::Sticker { .. } => "sendSticker",
            Self::VideoNote { .. } => "sendVideoNote",
            Self::Contact { .. } => "sendContact",
            Self::Location { .. } => "sendLocation",
            Self::Venue { .. } => "sendVenue",
            Self::Dice { .. } => "sendDice",
            Self::Unsupported => "unsupported",
        }
    }

    /// Send this content to `chat`, optionally as a reply. Callers must have
    /// rejected `Unsupported` content beforehand.
    pub async fn send(
        &self,
        bot: &ThrottledBot,
        chat: ChatId,
        reply_to: Option<MessageId>,
    ) -> Result<Message, teloxide::RequestError> {
        let reply = reply_to.map(ReplyParameters::new);
        match self {
            Self::Text { text, entities } => {
                let mut req = bot.send_message(chat, text.clone());
                if !entities.is_empty() {
                    req = req.entities(entities.clone());
                }
                if let Some(reply) = reply {
                    req = req.reply_parameters(reply);
                }
                req.await
            }
            Self::Photo { file_id, caption } => {
                let mut req = bot.send_photo(chat, InputFile::file_id(file_id.clone()));
                if let Some(text) = &caption.text {
                    req = req.caption(text.clone());
                }
                if !caption.entities.is_empty() {
                    req = req.caption_entities(caption.entities.clone());
                }
                if let Some(reply) = reply {
                    req = req.reply_parameters(reply);
                }
                req.await
            }
            Self::Document { file_id, caption } => {
                let mut req = bot.send_document(chat, InputFile::file_id(file_id.clone()));
                if let Some(text) = &caption.text {
                    req = req.caption(text.clone());
                }
                if !caption.entities.is_empty() {
                    req = req.caption_entities(caption.entities.clone());
                }
                if let Some(reply) = reply {
                    req = req.reply_parameters(reply);
                }
                req.await
            }
            Self::Video { file_id, caption } => {
                let mut req = bot.send_video(chat, InputFile::file_id(file_id.clone()));
                if let Some(text) = &caption.text {
                    req = req.caption(text.clone());
                }
                if !caption.entities.is_empty() {
                    req = req.caption_entities(caption.entities.clone());
                }
                if let Some(reply) = reply {
                    req = req.reply_parameters(reply);
                }
                req.await
            }
            Self::Audio { file_id, caption } => {
                let mut req = bot.send_audio(chat, InputFile::file_id(file_id.clone()));
                if let Some(text) = &caption.text {
                    req = req.caption(text.clone());
                }
                if !caption.entities.is_empty() {
                    req = req.caption_entities(caption.entities.clone());
                }
                if let Some(reply) = reply {
                    req = req.reply_parameters(reply);
                }
                req.await
            }
            Self::Voice { file_id, caption } => {
                let mut req = bot.send_voice(chat, InputFile::file_id(file_id.clone()));
                if let Some(text) = &caption.text {
                    req = req.caption(text.clone());
                }
                if !caption.entities.is_empty() {
                    req = req.caption_entities(caption.entities.clone());
                }
                if let Some(reply) = reply {
                    req = req.reply_parameters(reply);
                }
                req.await
            }
            Self::Animation { file_id, caption } => {
                let mut req = bot.send_animation(chat, InputFile::file_id(file_id.clone()));
                if let Some(text) = &caption.text {
                    req = req.caption(text.clone());
                }
                if !caption.entities.is_empty() {
                    req = req.caption_entities(caption.entities.clone());
                }
                if let Some(reply) = reply {
                    req = req.reply_parameters(reply);
                }
                req.await
            }
            Self::Sticker { file_id } => {
                let mut req = bot.send_sticker(chat, InputFile::file_id(file_id.clone()));
                if let Some(reply) = reply {
                    req = req.reply_parameters(reply);
                }
                req.await
            }
            Self::VideoNote { file_id } => {
                let mut req = bot.send_video_note(chat, InputFile::file_id(file_id.clone()));
                if let Some(reply) = reply {
                    req = req.reply_parameters(reply);
                }
                req.await
            }
            Self::Contact {
                phone_number,
                first_name,
                last_name,
                vcard,
            } => {
                let mut req = bot.send_contact(chat, phone_number.clone(), first_name.clone());
                if let Some(last_name) = last_name {
                    req = req.last_name(last_name.clone());
                }
                if let Some(vcard) = vcard {
                    req = req.vcard(vcard.clone());
                }
                if let Some(reply) = reply {
                    req = req.reply_parameters(reply);
                }
                req.await
            }
            Self::Location {
                latitude,
                longitude,
            } => {
                let mut req = bot.send_location(chat, *latitude, *longitude);
                if let Some(reply) = reply {
                    req = req.reply_parameters(reply);
                }
                req.await
            }
            Self::Venue {
                latitude,
                longitude,
                title,
                address,
            } => {
                let mut req =
                    bot.send_venue(chat, *latitude, *longitude, title.clone(), address.clone());
                if let Some(reply) = reply {
                    req = req.reply_parameters(reply);
                }
                req.await
            }
            Self::Dice { emoji } => {
                // A dice relay re-rolls: the value cannot be reproduced.
                let mut req = bot.send_dice(chat).emoji(*emoji);
                if let Some(reply) = reply {
                    req = req.reply_parameters(reply);
                }
                req.await
            }
            Self::Unsupported => unreachable!("unsupported content is rejected before send"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_names_match_the_bot_api() {
        let text = RelayContent::Text {
            text: "hi".into(),
            entities: vec![],
        };
        assert_eq!(text.method_name(), "sendMessage");

        let sticker = RelayContent::Sticker {
            file_id: "abc".into(),
        };
        assert_eq!(sticker.method_name(), "sendSticker");

        let venue = RelayContent::Venue {
            latitude: 0.0,
            longitude: 0.0,
            title: "t".into(),
            address: "a".into(),
        };
        assert_eq!(venue.method_name(), "sendVenue");

        assert_eq!(RelayContent::Unsupported.method_name(), "unsupported");
    }
}
