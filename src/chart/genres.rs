use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genre {
    pub name: &'static str,
    pub url: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenreInfo {
    pub slug: String,
    pub name: &'static str,
    pub url: &'static str,
}

/// Beatport Top-100 charts covered by the scraper.
pub const GENRES: &[Genre] = &[
    Genre { name: "140 - Deep / Dubstep / Grime", url: "https://www.beatport.com/genre/140-deep-dubstep-grime/95/top-100" },
    Genre { name: "Amapiano", url: "https://www.beatport.com/genre/amapiano/98/top-100" },
    Genre { name: "Afro House", url: "https://www.beatport.com/genre/afro-house/89/top-100" },
    Genre { name: "Ambient / Experimental", url: "https://www.beatport.com/genre/ambient-experimental/100/top-100" },
    Genre { name: "Bass Club", url: "https://www.beatport.com/genre/bass-club/85/top-100" },
    Genre { name: "Bass House", url: "https://www.beatport.com/genre/bass-house/91/top-100" },
    Genre { name: "Brazilian Funk", url: "https://www.beatport.com/genre/brazilian-funk/101/top-100" },
    Genre { name: "Breaks / Breakbeat / UK Bass", url: "https://www.beatport.com/genre/breaks-breakbeat-uk-bass/9/top-100" },
    Genre { name: "Dance / Pop", url: "https://www.beatport.com/genre/dance-pop/39/top-100" },
    Genre { name: "Deep House", url: "https://www.beatport.com/genre/deep-house/12/top-100" },
    Genre { name: "Downtempo", url: "https://www.beatport.com/genre/downtempo/63/top-100" },
    Genre { name: "Drum & Bass", url: "https://www.beatport.com/genre/drum-bass/1/top-100" },
    Genre { name: "Dubstep", url: "https://www.beatport.com/genre/dubstep/18/top-100" },
    Genre { name: "Electro / Classic / Detroit / Modern", url: "https://www.beatport.com/genre/electro-classic-detroit-modern/94/top-100" },
    Genre { name: "Electronica", url: "https://www.beatport.com/genre/electronica/3/top-100" },
    Genre { name: "Funky House", url: "https://www.beatport.com/genre/funky-house/81/top-100" },
    Genre { name: "Hard Dance / Hardcore / Neo-Rave", url: "https://www.beatport.com/genre/hard-dance-hardcore-neo-rave/8/top-100" },
    Genre { name: "Hard Techno", url: "https://www.beatport.com/genre/hard-techno/2/top-100" },
    Genre { name: "House", url: "https://www.beatport.com/genre/house/5/top-100" },
    Genre { name: "Indie Dance", url: "https://www.beatport.com/genre/indie-dance/37/top-100" },
    Genre { name: "Jackin House", url: "https://www.beatport.com/genre/jackin-house/97/top-100" },
    Genre { name: "Mainstage", url: "https://www.beatport.com/genre/mainstage/96/top-100" },
    Genre { name: "Melodic House & Techno", url: "https://www.beatport.com/genre/melodic-house-techno/90/top-100" },
    Genre { name: "Minimal / Deep / Tech", url: "https://www.beatport.com/genre/minimal-deep-tech/14/top-100" },
    Genre { name: "Nu-Disco / Disco", url: "https://www.beatport.com/genre/nu-disco-disco/50/top-100" },
    Genre { name: "Organic House", url: "https://www.beatport.com/genre/organic-house/93/top-100" },
    Genre { name: "Progressive House", url: "https://www.beatport.com/genre/progressive-house/15/top-100" },
    Genre { name: "Psy-Trance", url: "https://www.beatport.com/genre/psy-trance/13/top-100" },
    Genre { name: "Tech House", url: "https://www.beatport.com/genre/tech-house/11/top-100" },
    Genre { name: "Techno (Peak-time / Driving)", url: "https://www.beatport.com/genre/techno-peak-time-driving/6/top-100" },
    Genre { name: "Techno (Raw / Deep / Hypnotic)", url: "https://www.beatport.com/genre/techno-raw-deep-hypnotic/92/top-100" },
    Genre { name: "Trance (Main Floor)", url: "https://www.beatport.com/genre/trance-main-floor/7/top-100" },
    Genre { name: "Trance (Raw / Deep / Hypnotic)", url: "https://www.beatport.com/genre/trance-raw-deep-hypnotic/99/top-100" },
    Genre { name: "Trap / Future Bass", url: "https://www.beatport.com/genre/trap-future-bass/38/top-100" },
    Genre { name: "UK Garage / Bassline", url: "https://www.beatport.com/genre/uk-garage-bassline/86/top-100" },
];

/// The path segment following `/genre/` in a chart URL.
pub fn genre_slug_from_url(url: &str) -> Option<&str> {
    let (_, rest) = url.split_once("/genre/")?;
    let slug = rest.split('/').next()?;
    if slug.is_empty() {
        None
    } else {
        Some(slug)
    }
}

impl Genre {
    pub fn slug(&self) -> &'static str {
        genre_slug_from_url(self.url).unwrap_or(self.url)
    }

    pub fn info(&self) -> GenreInfo {
        GenreInfo {
            slug: self.slug().to_string(),
            name: self.name,
            url: self.url,
        }
    }
}

pub fn find_genre(slug: &str) -> Option<&'static Genre> {
    GENRES.iter().find(|g| g.slug() == slug)
}

pub fn default_genre() -> &'static Genre {
    &GENRES[0]
}

/// Known display name, or the slug with each word capitalized.
pub fn genre_display_name(slug: &str) -> String {
    if let Some(genre) = find_genre(slug) {
        return genre.name.to_string();
    }
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
