/*!

This is the long-form manual for `woca_scoring` and `wocascore`.

## The WOCA model

A WOCA survey has 36 questions, answered on a scale from 1 to 5. Each question
belongs to one of four categories (or zones): `war`, `opportunity`, `comfort`
and `apathy`, with 9 questions each.

For each participant:
- the score of a category is the mean of the answered questions of this category,
  divided by 5. Unanswered questions are ignored. A category without any answer
  scores 0 and is reported as missing.
- the dominant zone is the category with the highest score. If several categories
  share the highest score, the result is marked as a tie and the dominant zone is
  chosen according to the tiebreak mode. A participant who did not answer any
  question has no dominant zone.

For a group, the scores are the plain average of the scores of the participants,
and the dominant zone of the group is computed on these averages. A group needs
at least `minimumParticipants` participants (3 by default).

When only one overall score (from 1 to 5) is available, it is classified with fixed
thresholds:

| score        | zone          |
|--------------|---------------|
| 4.2 and more | `opportunity` |
| 3.4 and more | `comfort`     |
| 2.6 and more | `apathy`      |
| below 2.6    | `war`         |

## Input formats

The following formats are supported:
* `csv` Comma Separated Values
* `excel` Excel spreadsheets (.xlsx)
* `json` An array of rows, as exported by the data store

### `csv` and `excel`

One participant per row. The first row is the header. By default, the first
column is the participant id, the second one the name, and the 36 answers follow
in question order:

| id  | name  | q1 | q2 | ... | q36 |
|-----|-------|----|----|-----|-----|
| p01 | Maya  | 4  | 2  | ... | 5   |
| p02 | Omer  |    | 3  | ... | 1   |

Empty cells are unanswered questions. The layout can be changed with the
`firstQuestionColumnIndex`, `firstResponseRowIndex`, `idColumnIndex` and
`nameColumnIndex` options (starting at 1, spreadsheet letters are accepted).
If the columns are not in question order, `questionColumns` lists the header of each
question, from question 1 to question 36.

### `json`

```json
[
  {"id": "p01", "name": "Maya", "q1": 4, "q2": 2, "q3": null},
  {"id": "p02", "name": "Omer", "q1": "5"}
]
```

Missing keys and `null` values are unanswered questions. The prefix of the keys
can be changed with `questionKeyPrefix`.

## Configuration

```json
{
  "outputSettings": {
    "surveyName": "Leadership workshop",
    "surveyDate": "2024-03-12",
    "organization": "Team A"
  },
  "responseSources": [
    {
      "provider": "csv",
      "filePath": "responses.csv",
      "firstQuestionColumnIndex": 3,
      "idColumnIndex": 1,
      "nameColumnIndex": 2
    }
  ],
  "rules": {
    "tiebreakMode": "priorityOrder",
    "minimumParticipants": "3",
    "invalidResponseRule": "reject"
  }
}
```

`tiebreakMode` is one of:
- `priorityOrder`: war, then opportunity, then comfort, then apathy
- `noDominant`: no dominant zone is reported for a tie
- `random`: requires `randomSeed` (`--random-seed` on the command line). The choice is reproducible for a given seed.

`invalidResponseRule` controls the answers outside of 1..5: `reject` (stop with an
error), `skip` (treat as unanswered) or `accept` (keep the value).

`questionMap` (optional) overrides the assignment of the questions to the
categories. It must list 9 distinct questions for each category:

```json
"questionMap": {
  "war": [1, 5, 9, 13, 17, 21, 25, 29, 33],
  "opportunity": [2, 6, 10, 14, 18, 22, 26, 30, 34],
  "comfort": [3, 7, 11, 15, 19, 23, 27, 31, 35],
  "apathy": [4, 8, 12, 16, 20, 24, 28, 32, 36]
}
```

*/
